// Copyright 2025 Lablup Inc. and Jeongkyu Shin
// Copyright 2023 ByteDance and/or its affiliates.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use super::control::FtpControlChannel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FtpCommand(&'static str);

impl FtpCommand {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

macro_rules! ftp_commands {
    (
        $(
            $(#[$docs:meta])*
            ($konst:ident, $phrase:expr);
        )+
    ) => {
        impl FtpCommand {
        $(
            $(#[$docs])*
            pub const $konst: FtpCommand = FtpCommand($phrase);
        )+
        }
    };
}

ftp_commands! {
    /// pseudo command used while waiting for the server greeting
    (GREETING, "-");
    (USER, "USER");
    (PASS, "PASS");
    (QUIT, "QUIT");
    (CWD, "CWD");
    (TYPE_I, "TYPE I");
    (PASV, "PASV");
    (EPSV, "EPSV");
    (SIZE, "SIZE");
    (NLST, "NLST");
    (RETR, "RETR");
    (STOR, "STOR");
    (DELE, "DELE");
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    async fn send_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stream.write_all(buf).await?;
        self.stream.flush().await
    }

    pub(super) async fn send_cmd(&mut self, cmd: FtpCommand) -> io::Result<()> {
        tracing::trace!("ftp >> {cmd}");

        let mut buf: Vec<u8> = Vec::with_capacity(cmd.0.len() + 2);
        buf.extend_from_slice(cmd.0.as_bytes());
        buf.extend_from_slice(b"\r\n");

        self.send_all(&buf).await
    }

    pub(super) async fn send_cmd1(&mut self, cmd: FtpCommand, param1: &str) -> io::Result<()> {
        if cmd == FtpCommand::PASS {
            tracing::trace!("ftp >> {cmd} ****");
        } else {
            tracing::trace!("ftp >> {cmd} {param1}");
        }

        let mut buf: Vec<u8> = Vec::with_capacity(cmd.0.len() + 1 + param1.len() + 2);
        buf.extend_from_slice(cmd.0.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(param1.as_bytes());
        buf.extend_from_slice(b"\r\n");

        self.send_all(&buf).await
    }
}
