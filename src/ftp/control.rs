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

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};

use super::FtpError;
use super::command::FtpCommand;
use super::response::FtpReply;

#[derive(Debug, Clone)]
pub(crate) struct FtpControlConfig {
    pub(crate) max_line_len: usize,
    pub(crate) max_multi_lines: usize,
    pub(crate) command_timeout: Duration,
}

impl Default for FtpControlConfig {
    fn default() -> Self {
        FtpControlConfig {
            max_line_len: 2048,
            max_multi_lines: 128,
            command_timeout: Duration::from_secs(60),
        }
    }
}

pub(crate) enum FtpAuthStatus {
    LoggedIn,
    NeedPassword,
    NeedAccount,
    NotLoggedIn(String),
}

pub(crate) struct FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite,
{
    pub(super) config: FtpControlConfig,
    pub(super) stream: BufStream<T>,
}

fn unexpected(cmd: FtpCommand, reply: &FtpReply) -> FtpError {
    FtpError::UnexpectedReply {
        cmd,
        code: reply.code(),
        message: reply.message(),
    }
}

fn rejected(cmd: FtpCommand, reply: &FtpReply) -> FtpError {
    FtpError::FileActionRejected {
        cmd,
        code: reply.code(),
        message: reply.message(),
    }
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: T, config: FtpControlConfig) -> Self {
        FtpControlChannel {
            config,
            stream: BufStream::new(stream),
        }
    }

    async fn exchange(
        &mut self,
        cmd: FtpCommand,
        param: Option<&str>,
        stage: &'static str,
    ) -> Result<FtpReply, FtpError> {
        let sent = match param {
            Some(p) => self.send_cmd1(cmd, p).await,
            None => self.send_cmd(cmd).await,
        };
        sent.map_err(|e| FtpError::SendFailed(cmd, e))?;
        self.timed_read_reply(stage).await
    }

    pub(crate) async fn wait_greetings(&mut self) -> Result<(), FtpError> {
        loop {
            let reply = self.timed_read_reply("wait greetings").await?;
            return match reply.code() {
                120 => continue,
                220 => Ok(()),
                421 => Err(FtpError::ServiceNotAvailable(reply.message())),
                _ => Err(unexpected(FtpCommand::GREETING, &reply)),
            };
        }
    }

    pub(crate) async fn send_username(&mut self, name: &str) -> Result<FtpAuthStatus, FtpError> {
        let cmd = FtpCommand::USER;
        let reply = self.exchange(cmd, Some(name), "send username").await?;
        match reply.code() {
            230 => Ok(FtpAuthStatus::LoggedIn),
            331 => Ok(FtpAuthStatus::NeedPassword),
            332 => Ok(FtpAuthStatus::NeedAccount),
            530 => Ok(FtpAuthStatus::NotLoggedIn(reply.message())),
            421 => Err(FtpError::ServiceNotAvailable(reply.message())),
            _ => Err(unexpected(cmd, &reply)),
        }
    }

    pub(crate) async fn send_password(&mut self, pass: &str) -> Result<FtpAuthStatus, FtpError> {
        let cmd = FtpCommand::PASS;
        let reply = self.exchange(cmd, Some(pass), "send password").await?;
        match reply.code() {
            202 | 230 => Ok(FtpAuthStatus::LoggedIn),
            332 => Ok(FtpAuthStatus::NeedAccount),
            530 => Ok(FtpAuthStatus::NotLoggedIn(reply.message())),
            421 => Err(FtpError::ServiceNotAvailable(reply.message())),
            _ => Err(unexpected(cmd, &reply)),
        }
    }

    pub(crate) async fn request_transfer_type_image(&mut self) -> Result<(), FtpError> {
        let cmd = FtpCommand::TYPE_I;
        let reply = self.exchange(cmd, None, "request transfer type").await?;
        match reply.code() {
            200 => Ok(()),
            530 => Err(FtpError::NotLoggedIn(reply.message())),
            421 => Err(FtpError::ServiceNotAvailable(reply.message())),
            _ => Err(unexpected(cmd, &reply)),
        }
    }

    pub(crate) async fn change_working_dir(&mut self, path: &str) -> Result<(), FtpError> {
        let cmd = FtpCommand::CWD;
        let reply = self.exchange(cmd, Some(path), "change working dir").await?;
        match reply.code() {
            200 | 250 => Ok(()),
            450 | 550 => Err(rejected(cmd, &reply)),
            530 => Err(FtpError::NotLoggedIn(reply.message())),
            421 => Err(FtpError::ServiceNotAvailable(reply.message())),
            _ => Err(unexpected(cmd, &reply)),
        }
    }

    pub(crate) async fn request_epsv_port(&mut self) -> Result<u16, FtpError> {
        let cmd = FtpCommand::EPSV;
        let reply = self.exchange(cmd, None, "request epsv port").await?;
        match reply.code() {
            229 => reply
                .parse_epsv_229_reply()
                .ok_or(FtpError::InvalidReplySyntax(cmd, 229)),
            500 | 501 | 502 | 522 => Err(FtpError::CommandNotImplemented(cmd)),
            530 => Err(FtpError::NotLoggedIn(reply.message())),
            421 => Err(FtpError::ServiceNotAvailable(reply.message())),
            _ => Err(unexpected(cmd, &reply)),
        }
    }

    pub(crate) async fn request_pasv_port(&mut self) -> Result<SocketAddr, FtpError> {
        let cmd = FtpCommand::PASV;
        let reply = self.exchange(cmd, None, "request pasv port").await?;
        match reply.code() {
            227 => reply
                .parse_pasv_227_reply()
                .ok_or(FtpError::InvalidReplySyntax(cmd, 227)),
            500 | 501 | 502 => Err(FtpError::CommandNotImplemented(cmd)),
            530 => Err(FtpError::NotLoggedIn(reply.message())),
            421 => Err(FtpError::ServiceNotAvailable(reply.message())),
            _ => Err(unexpected(cmd, &reply)),
        }
    }

    /// `Ok(None)` when the server cannot tell, either because SIZE is not
    /// implemented or the file is not visible.
    pub(crate) async fn request_size(&mut self, path: &str) -> Result<Option<u64>, FtpError> {
        let cmd = FtpCommand::SIZE;
        let reply = self.exchange(cmd, Some(path), "request size").await?;
        match reply.code() {
            213 => u64::from_str(reply.first_line())
                .map(Some)
                .map_err(|_| FtpError::InvalidReplySyntax(cmd, 213)),
            500 | 501 | 502 | 504 | 550 => Ok(None),
            530 => Err(FtpError::NotLoggedIn(reply.message())),
            421 => Err(FtpError::ServiceNotAvailable(reply.message())),
            _ => Err(unexpected(cmd, &reply)),
        }
    }

    /// Sends a transfer command (STOR, RETR, NLST) and waits for the
    /// preliminary reply announcing the data connection.
    pub(crate) async fn start_transfer(
        &mut self,
        cmd: FtpCommand,
        path: Option<&str>,
    ) -> Result<(), FtpError> {
        let reply = self.exchange(cmd, path, "start transfer").await?;
        match reply.code() {
            125 | 150 => Ok(()),
            450 | 452 | 532 | 550 | 553 => Err(rejected(cmd, &reply)),
            530 => Err(FtpError::NotLoggedIn(reply.message())),
            421 => Err(FtpError::ServiceNotAvailable(reply.message())),
            _ => Err(unexpected(cmd, &reply)),
        }
    }

    pub(crate) async fn wait_transfer_end(&mut self, cmd: FtpCommand) -> Result<(), FtpError> {
        let reply = self.timed_read_reply("wait transfer end").await?;
        match reply.code() {
            226 | 250 => Ok(()),
            451 | 452 | 551 | 552 => Err(rejected(cmd, &reply)),
            425 | 426 => Err(FtpError::DataTransferFailed(reply.message())),
            421 => Err(FtpError::ServiceNotAvailable(reply.message())),
            _ => Err(unexpected(cmd, &reply)),
        }
    }

    pub(crate) async fn delete_file(&mut self, path: &str) -> Result<(), FtpError> {
        let cmd = FtpCommand::DELE;
        let reply = self.exchange(cmd, Some(path), "delete file").await?;
        match reply.code() {
            250 => Ok(()),
            450 | 550 => Err(rejected(cmd, &reply)),
            530 => Err(FtpError::NotLoggedIn(reply.message())),
            421 => Err(FtpError::ServiceNotAvailable(reply.message())),
            _ => Err(unexpected(cmd, &reply)),
        }
    }

    pub(crate) async fn send_quit(&mut self) -> Result<(), FtpError> {
        let cmd = FtpCommand::QUIT;
        let reply = self.exchange(cmd, None, "send quit").await?;
        match reply.code() {
            221 => Ok(()),
            _ => Err(unexpected(cmd, &reply)),
        }
    }

    pub(crate) async fn shutdown(&mut self) {
        if let Err(e) = self.stream.get_mut().shutdown().await {
            tracing::debug!("ftp control shutdown: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};

    /// Replays canned replies and records every command line received.
    async fn scripted(
        replies: &'static [&'static str],
    ) -> (
        FtpControlChannel<tokio::io::DuplexStream>,
        tokio::task::JoinHandle<Vec<String>>,
    ) {
        let (client, server) = tokio::io::duplex(4096);
        let handle = tokio::spawn(async move {
            let (rd, mut wr) = tokio::io::split(server);
            let mut lines = BufReader::new(rd).lines();
            let mut seen = Vec::new();
            for reply in replies {
                match lines.next_line().await {
                    Ok(Some(line)) => seen.push(line),
                    _ => break,
                }
                wr.write_all(reply.as_bytes()).await.unwrap();
            }
            seen
        });
        (
            FtpControlChannel::new(client, FtpControlConfig::default()),
            handle,
        )
    }

    #[tokio::test]
    async fn test_login_sequence() {
        let (mut control, server) =
            scripted(&["331 Password required\r\n", "230 Logged in\r\n"]).await;

        assert!(matches!(
            control.send_username("vip").await.unwrap(),
            FtpAuthStatus::NeedPassword
        ));
        assert!(matches!(
            control.send_password("secret").await.unwrap(),
            FtpAuthStatus::LoggedIn
        ));
        drop(control);
        assert_eq!(server.await.unwrap(), vec!["USER vip", "PASS secret"]);
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let (mut control, _server) =
            scripted(&["331 Password required\r\n", "530 Login incorrect.\r\n"]).await;

        control.send_username("vip").await.unwrap();
        match control.send_password("wrong").await.unwrap() {
            FtpAuthStatus::NotLoggedIn(msg) => assert_eq!(msg, "Login incorrect."),
            _ => panic!("expected NotLoggedIn"),
        }
    }

    #[tokio::test]
    async fn test_change_dir_missing() {
        let (mut control, _server) =
            scripted(&["550 /missing: No such file or directory\r\n"]).await;

        match control.change_working_dir("/missing").await {
            Err(FtpError::FileActionRejected { cmd, code, .. }) => {
                assert_eq!(cmd, FtpCommand::CWD);
                assert_eq!(code, 550);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_epsv_not_implemented() {
        let (mut control, _server) = scripted(&["502 Command not implemented\r\n"]).await;

        assert!(matches!(
            control.request_epsv_port().await,
            Err(FtpError::CommandNotImplemented(FtpCommand::EPSV))
        ));
    }

    #[tokio::test]
    async fn test_request_size() {
        let (mut control, _server) = scripted(&[
            "213 1024\r\n",
            "550 Could not get file size.\r\n",
            "502 SIZE not implemented\r\n",
        ])
        .await;

        assert_eq!(control.request_size("a.DAT").await.unwrap(), Some(1024));
        assert_eq!(control.request_size("b.DAT").await.unwrap(), None);
        assert_eq!(control.request_size("c.DAT").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_rejected_for_disk_full() {
        let (mut control, _server) = scripted(&["452 Insufficient storage space\r\n"]).await;

        match control.start_transfer(FtpCommand::STOR, Some("a.DAT")).await {
            Err(FtpError::FileActionRejected { code, message, .. }) => {
                assert_eq!(code, 452);
                assert_eq!(message, "Insufficient storage space");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
