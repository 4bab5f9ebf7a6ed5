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

//! Minimal asynchronous FTP client covering what a GDI drop needs:
//! login, CWD, passive-mode STOR/RETR/NLST, SIZE, DELE and QUIT.
//!
//! Data connections are always passive. EPSV is tried first and PASV is
//! used as a fallback; in both cases the data connection goes to the IP
//! of the control connection, only the port announced by the server is
//! used.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{Error, Result};
use crate::transfer::{ConnectOptions, RemoteSession};

mod command;
mod control;
mod error;
mod response;

pub use command::FtpCommand;
pub use error::FtpError;

use control::{FtpAuthStatus, FtpControlChannel, FtpControlConfig};

/// Well-known FTP control port.
pub const FTP_DEFAULT_PORT: u16 = 21;

fn remote_error(
    operation: &'static str,
    path: &str,
    user: &str,
) -> impl FnOnce(FtpError) -> Error + use<> {
    let path = path.to_string();
    let user = user.to_string();
    move |e| match e {
        FtpError::FileActionRejected { code, message, .. } => {
            Error::remote(operation, path, format!("{code} {message}"))
        }
        FtpError::NotLoggedIn(message) => Error::Authentication {
            user,
            reason: format!("530 {message}"),
        },
        e => Error::Ftp(e),
    }
}

fn parse_name_list(data: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(data)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| l.rsplit('/').next().unwrap_or(l).to_string())
        .filter(|n| !n.is_empty() && n != "." && n != "..")
        .collect()
}

/// An FTP control connection plus the state needed to open data
/// connections on demand.
pub struct FtpConnection {
    control: FtpControlChannel<TcpStream>,
    peer: SocketAddr,
    connect_timeout: Duration,
    user: String,
    cwd: String,
    closed: bool,
}

impl FtpConnection {
    /// Connect to `host:port` and wait for the server greeting.
    ///
    /// The returned connection is not logged in yet.
    pub async fn connect(host: &str, port: u16, options: &ConnectOptions) -> Result<Self> {
        let address = format!("{host}:{port}");
        let stream = match tokio::time::timeout(
            options.connect_timeout,
            TcpStream::connect((host, port)),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(Error::Connect { address, source }),
            Err(_) => {
                return Err(Error::ConnectTimeout {
                    address,
                    timeout: options.connect_timeout,
                });
            }
        };
        let peer = stream.peer_addr()?;

        let config = FtpControlConfig {
            command_timeout: options.command_timeout,
            ..Default::default()
        };
        let mut control = FtpControlChannel::new(stream, config);
        control.wait_greetings().await?;
        tracing::debug!("FTP control connection established to {peer}");

        Ok(FtpConnection {
            control,
            peer,
            connect_timeout: options.connect_timeout,
            user: String::new(),
            cwd: String::new(),
            closed: false,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn remote_path(&self, name: &str) -> String {
        if self.cwd.is_empty() {
            name.to_string()
        } else if self.cwd.ends_with('/') {
            format!("{}{name}", self.cwd)
        } else {
            format!("{}/{name}", self.cwd)
        }
    }

    /// USER/PASS, then switch to binary transfers.
    pub async fn login(&mut self, user: &str, password: &str) -> Result<()> {
        let auth_failed = |reason: String| Error::Authentication {
            user: user.to_string(),
            reason,
        };

        let status = match self.control.send_username(user).await? {
            FtpAuthStatus::NeedPassword => self.control.send_password(password).await?,
            status => status,
        };
        match status {
            FtpAuthStatus::LoggedIn => {}
            FtpAuthStatus::NotLoggedIn(msg) => return Err(auth_failed(format!("530 {msg}"))),
            FtpAuthStatus::NeedAccount => {
                return Err(auth_failed("server requires an account (ACCT)".to_string()));
            }
            FtpAuthStatus::NeedPassword => {
                return Err(auth_failed("password requested twice".to_string()));
            }
        }

        self.user = user.to_string();
        self.control
            .request_transfer_type_image()
            .await
            .map_err(remote_error("login", "", user))?;
        tracing::debug!("FTP logged in as {user}");
        Ok(())
    }

    pub async fn change_dir(&mut self, folder: &str) -> Result<()> {
        if folder.is_empty() {
            return Ok(());
        }
        self.control
            .change_working_dir(folder)
            .await
            .map_err(remote_error("change directory", folder, &self.user))?;
        self.cwd = folder.to_string();
        Ok(())
    }

    async fn open_data_stream(&mut self) -> Result<TcpStream> {
        let port = match self.control.request_epsv_port().await {
            Ok(port) => port,
            Err(FtpError::CommandNotImplemented(_)) => {
                tracing::debug!("EPSV unsupported, falling back to PASV");
                self.control
                    .request_pasv_port()
                    .await
                    .map_err(remote_error("passive mode", &self.cwd, &self.user))?
                    .port()
            }
            Err(e) => return Err(remote_error("passive mode", &self.cwd, &self.user)(e)),
        };

        let data_addr = SocketAddr::new(self.peer.ip(), port);
        match tokio::time::timeout(self.connect_timeout, TcpStream::connect(data_addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(Error::Connect {
                address: data_addr.to_string(),
                source,
            }),
            Err(_) => Err(Error::ConnectTimeout {
                address: data_addr.to_string(),
                timeout: self.connect_timeout,
            }),
        }
    }

    /// STOR `name` in the current directory, returning the number of bytes sent.
    pub async fn store<R>(&mut self, name: &str, reader: &mut R) -> Result<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let path = self.remote_path(name);
        let mut data = self.open_data_stream().await?;
        self.control
            .start_transfer(FtpCommand::STOR, Some(name))
            .await
            .map_err(remote_error("store", &path, &self.user))?;

        let sent = tokio::io::copy(reader, &mut data).await?;
        data.shutdown().await?;
        drop(data);

        self.control
            .wait_transfer_end(FtpCommand::STOR)
            .await
            .map_err(remote_error("store", &path, &self.user))?;
        Ok(sent)
    }

    /// RETR `name` from the current directory into `writer`.
    pub async fn retrieve<W>(&mut self, name: &str, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let path = self.remote_path(name);
        let mut data = self.open_data_stream().await?;
        self.control
            .start_transfer(FtpCommand::RETR, Some(name))
            .await
            .map_err(remote_error("retrieve", &path, &self.user))?;

        let received = tokio::io::copy(&mut data, writer).await?;
        writer.flush().await?;
        drop(data);

        self.control
            .wait_transfer_end(FtpCommand::RETR)
            .await
            .map_err(remote_error("retrieve", &path, &self.user))?;
        Ok(received)
    }

    /// NLST of the current directory, reduced to bare file names.
    pub async fn list(&mut self) -> Result<Vec<String>> {
        let path = self.cwd.clone();
        let mut data = self.open_data_stream().await?;
        self.control
            .start_transfer(FtpCommand::NLST, None)
            .await
            .map_err(remote_error("list", &path, &self.user))?;

        let mut buf = Vec::new();
        data.read_to_end(&mut buf).await?;
        drop(data);

        self.control
            .wait_transfer_end(FtpCommand::NLST)
            .await
            .map_err(remote_error("list", &path, &self.user))?;
        Ok(parse_name_list(&buf))
    }

    pub async fn size(&mut self, name: &str) -> Result<Option<u64>> {
        let path = self.remote_path(name);
        self.control
            .request_size(name)
            .await
            .map_err(remote_error("size", &path, &self.user))
    }

    pub async fn delete(&mut self, name: &str) -> Result<()> {
        let path = self.remote_path(name);
        self.control
            .delete_file(name)
            .await
            .map_err(remote_error("delete", &path, &self.user))
    }

    /// Send QUIT and shut the control connection down. Safe to call twice.
    pub async fn quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let quit = self.control.send_quit().await;
        self.control.shutdown().await;
        tracing::debug!("FTP connection to {} closed", self.peer);
        quit.map_err(Error::from)
    }
}

#[async_trait]
impl RemoteSession for FtpConnection {
    async fn login(&mut self, user: &str, password: &str) -> Result<()> {
        FtpConnection::login(self, user, password).await
    }

    async fn change_dir(&mut self, folder: &str) -> Result<()> {
        FtpConnection::change_dir(self, folder).await
    }

    async fn store(
        &mut self,
        name: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<u64> {
        FtpConnection::store(self, name, reader).await
    }

    async fn size(&mut self, name: &str) -> Result<Option<u64>> {
        FtpConnection::size(self, name).await
    }

    async fn list(&mut self) -> Result<Vec<String>> {
        FtpConnection::list(self).await
    }

    async fn retrieve(
        &mut self,
        name: &str,
        writer: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64> {
        FtpConnection::retrieve(self, name, writer).await
    }

    async fn delete(&mut self, name: &str) -> Result<()> {
        FtpConnection::delete(self, name).await
    }

    async fn close(&mut self) -> Result<()> {
        self.quit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_list() {
        let data = concat!(
            "85_ORDERS_1_20250101_080000.DAT\r\n",
            "/inbound/90_SALESHISTORY_7_20250101_080000.DAT\r\n",
            "\r\n.\r\n..\r\n",
        )
        .as_bytes();
        assert_eq!(
            parse_name_list(data),
            vec![
                "85_ORDERS_1_20250101_080000.DAT",
                "90_SALESHISTORY_7_20250101_080000.DAT"
            ]
        );
        assert!(parse_name_list(b"").is_empty());
    }

    #[test]
    fn test_remote_error_mapping() {
        let err = remote_error("store", "/inbound/a.DAT", "vip")(FtpError::FileActionRejected {
            cmd: FtpCommand::STOR,
            code: 553,
            message: "Could not create file.".to_string(),
        });
        match err {
            Error::RemoteOperation {
                operation,
                path,
                reason,
            } => {
                assert_eq!(operation, "store");
                assert_eq!(path, "/inbound/a.DAT");
                assert_eq!(reason, "553 Could not create file.");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = remote_error("store", "a", "vip")(FtpError::ConnectionClosed);
        assert!(matches!(err, Error::Ftp(FtpError::ConnectionClosed)));
    }

    #[test]
    fn test_not_logged_in_maps_to_authentication() {
        let err = remote_error("store", "/inbound/a.DAT", "vip")(FtpError::NotLoggedIn(
            "Please login with USER and PASS.".to_string(),
        ));
        match err {
            Error::Authentication { user, reason } => {
                assert_eq!(user, "vip");
                assert_eq!(reason, "530 Please login with USER and PASS.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
