// Copyright 2025 Lablup Inc. and Jeongkyu Shin
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

use std::time::Duration;

use crate::ftp::FTP_DEFAULT_PORT;
use crate::sftp::ServerCheckMethod;

/// Network settings applied to every connection a
/// [`NetworkConnector`](super::NetworkConnector) opens.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Limit for TCP connect plus the SSH handshake.
    ///
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Limit for each FTP reply, and the SSH inactivity timeout.
    ///
    /// Default: 60 seconds
    pub command_timeout: Duration,

    /// FTP control port. The per-call port only applies to SFTP.
    ///
    /// Default: 21
    pub ftp_port: u16,

    /// How the SSH server key is verified.
    ///
    /// Default: accept any key
    pub server_check: ServerCheckMethod,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(60),
            ftp_port: FTP_DEFAULT_PORT,
            server_check: ServerCheckMethod::NoCheck,
        }
    }
}
