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

//! SFTP sessions over russh with password authentication.
//!
//! The SSH connection is opened by [`SftpConnection::connect`]; the SFTP
//! subsystem is only started once [`login`](RemoteSession::login)
//! succeeds. Servers that only offer keyboard-interactive get the same
//! password as the answer to every prompt.
//!
//! Some sshd_config files do not enable sftp by default, a line like
//! `Subsystem sftp internal-sftp` is needed on the server.

mod handler;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{AuthResult, Config, Handle, KeyboardInteractiveAuthResponse};
use russh::{MethodKind, MethodSet};
use russh_sftp::client::SftpSession;
use russh_sftp::client::error::Error as SftpError;
use russh_sftp::protocol::OpenFlags;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::transfer::{ConnectOptions, RemoteSession};

pub use handler::{ClientHandler, ServerCheckMethod};

/// Turn SFTP status replies into [`Error::RemoteOperation`].
fn remote_error(operation: &'static str, path: &str) -> impl FnOnce(SftpError) -> Error + use<> {
    let path = path.to_string();
    move |e| match e {
        SftpError::Status(status) => Error::remote(
            operation,
            path,
            format!("{:?}: {}", status.status_code, status.error_message),
        ),
        e => Error::Sftp(e),
    }
}

fn method_names(methods: &MethodSet) -> String {
    let names: Vec<&'static str> = methods.iter().map(<&'static str>::from).collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(",")
    }
}

fn join_remote(dir: Option<&str>, name: &str) -> String {
    match dir {
        Some(dir) => format!("{}/{name}", dir.trim_end_matches('/')),
        None => name.to_string(),
    }
}

/// An SSH connection and, after login, its SFTP session.
pub struct SftpConnection {
    handle: Handle<ClientHandler>,
    sftp: Option<SftpSession>,
    host: String,
    user: String,
    cwd: Option<String>,
    command_timeout: Duration,
    closed: bool,
}

impl SftpConnection {
    /// Open the SSH connection and verify the server key.
    ///
    /// The returned connection is not authenticated yet.
    pub async fn connect(host: &str, port: u16, options: &ConnectOptions) -> Result<Self> {
        let address = format!("{host}:{port}");
        let config = Arc::new(Config {
            inactivity_timeout: Some(options.command_timeout),
            ..Default::default()
        });
        let handler = ClientHandler::new(host, port, options.server_check.clone());

        let handle = match tokio::time::timeout(
            options.connect_timeout,
            russh::client::connect(config, (host, port), handler),
        )
        .await
        {
            Ok(Ok(handle)) => handle,
            Ok(Err(Error::Ssh(russh::Error::UnknownKey))) => {
                return Err(Error::HostKeyRejected { host: address });
            }
            Ok(Err(Error::Ssh(russh::Error::IO(source)))) => {
                return Err(Error::Connect { address, source });
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(Error::ConnectTimeout {
                    address,
                    timeout: options.connect_timeout,
                });
            }
        };
        tracing::debug!("SSH connection to {address} established");

        Ok(Self {
            handle,
            sftp: None,
            host: host.to_string(),
            user: String::new(),
            cwd: None,
            command_timeout: options.command_timeout,
            closed: false,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn session(&self) -> Result<&SftpSession> {
        self.sftp.as_ref().ok_or_else(|| {
            Error::invalid_argument(format!("SFTP session to {} is not logged in", self.host))
        })
    }

    fn remote_path(&self, name: &str) -> String {
        join_remote(self.cwd.as_deref(), name)
    }

    /// Answer every keyboard-interactive prompt with `password`.
    ///
    /// Returns the methods the server still offers when it rejects us.
    async fn keyboard_interactive(
        &mut self,
        user: &str,
        password: &str,
    ) -> Result<Option<MethodSet>> {
        let mut response = self
            .handle
            .authenticate_keyboard_interactive_start(user, None::<String>)
            .await?;
        loop {
            let prompts = match response {
                KeyboardInteractiveAuthResponse::Success => return Ok(None),
                KeyboardInteractiveAuthResponse::Failure {
                    remaining_methods, ..
                } => return Ok(Some(remaining_methods)),
                KeyboardInteractiveAuthResponse::InfoRequest { prompts, .. } => prompts,
            };
            tracing::trace!("Answering {} keyboard-interactive prompt(s)", prompts.len());
            let answers = prompts.iter().map(|_| password.to_string()).collect();
            response = self
                .handle
                .authenticate_keyboard_interactive_respond(answers)
                .await?;
        }
    }
}

#[async_trait]
impl RemoteSession for SftpConnection {
    async fn login(&mut self, user: &str, password: &str) -> Result<()> {
        let rejected = |reason: &str, remaining: &MethodSet| Error::Authentication {
            user: user.to_string(),
            reason: format!("{reason} (server offers: {})", method_names(remaining)),
        };

        match self.handle.authenticate_password(user, password).await? {
            AuthResult::Success => {}
            AuthResult::Failure {
                remaining_methods, ..
            } => {
                if !remaining_methods.contains(&MethodKind::KeyboardInteractive) {
                    return Err(rejected("password rejected by server", &remaining_methods));
                }
                tracing::debug!(
                    "Password method rejected by {}, trying keyboard-interactive",
                    self.host
                );
                if let Some(remaining) = self.keyboard_interactive(user, password).await? {
                    return Err(rejected(
                        "password and keyboard-interactive rejected by server",
                        &remaining,
                    ));
                }
            }
        }
        self.user = user.to_string();
        tracing::debug!("Authenticated to {} as {user}", self.host);

        let channel = self.handle.channel_open_session().await?;
        channel.request_subsystem(true, "sftp").await?;
        let sftp = SftpSession::new(channel.into_stream()).await?;
        sftp.set_timeout(self.command_timeout.as_secs().max(1));
        self.sftp = Some(sftp);
        Ok(())
    }

    async fn change_dir(&mut self, folder: &str) -> Result<()> {
        if folder.is_empty() {
            return Ok(());
        }
        let sftp = self.session()?;
        let real = sftp
            .canonicalize(folder)
            .await
            .map_err(remote_error("change directory", folder))?;
        let attrs = sftp
            .metadata(real.clone())
            .await
            .map_err(remote_error("change directory", folder))?;
        // Some servers leave the permission bits out of STAT replies.
        if attrs.permissions.is_some() && !attrs.is_dir() {
            return Err(Error::remote(
                "change directory",
                folder,
                "not a directory",
            ));
        }
        tracing::debug!("Using remote folder {real}");
        self.cwd = Some(real);
        Ok(())
    }

    async fn store(
        &mut self,
        name: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<u64> {
        let path = self.remote_path(name);
        let mut file = self
            .session()?
            .open_with_flags(
                path.clone(),
                OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::WRITE,
            )
            .await
            .map_err(remote_error("store", &path))?;
        let sent = tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        file.shutdown().await?;
        Ok(sent)
    }

    async fn size(&mut self, name: &str) -> Result<Option<u64>> {
        let path = self.remote_path(name);
        let attrs = self
            .session()?
            .metadata(path.clone())
            .await
            .map_err(remote_error("size", &path))?;
        Ok(attrs.size)
    }

    async fn list(&mut self) -> Result<Vec<String>> {
        let dir = self.cwd.clone().unwrap_or_else(|| ".".to_string());
        let entries = self
            .session()?
            .read_dir(dir.clone())
            .await
            .map_err(remote_error("list", &dir))?;
        Ok(entries
            .filter(|entry| !entry.metadata().is_dir())
            .map(|entry| entry.file_name())
            .filter(|name| name != "." && name != "..")
            .collect())
    }

    async fn retrieve(
        &mut self,
        name: &str,
        writer: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64> {
        let path = self.remote_path(name);
        let mut file = self
            .session()?
            .open_with_flags(path.clone(), OpenFlags::READ)
            .await
            .map_err(remote_error("retrieve", &path))?;
        let received = tokio::io::copy(&mut file, writer).await?;
        writer.flush().await?;
        Ok(received)
    }

    async fn delete(&mut self, name: &str) -> Result<()> {
        let path = self.remote_path(name);
        self.session()?
            .remove_file(path.clone())
            .await
            .map_err(remote_error("delete", &path))
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Some(sftp) = self.sftp.take()
            && let Err(e) = sftp.close().await
        {
            tracing::debug!("Closing SFTP session to {} failed: {e}", self.host);
        }
        if self.handle.is_closed() {
            return Ok(());
        }
        self.handle
            .disconnect(russh::Disconnect::ByApplication, "", "")
            .await?;
        tracing::debug!("SFTP connection {}@{} closed", self.user, self.host);
        Ok(())
    }
}
