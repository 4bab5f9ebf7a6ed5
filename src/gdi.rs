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

//! Operations against the VIP GDI drop server.
//!
//! Each operation opens one session, runs its steps in order and closes
//! the session again, whatever the outcome. Nothing is retried.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::transfer::{Connector, Endpoint, FileSource, NetworkConnector, RemoteSession};
use crate::utils::{download_path, format_bytes};

/// Upload `file` into `folder` on `host` using FTP or SFTP.
///
/// `ftp_method` is `"ftp"` or `"sftp"` in any case; anything else fails
/// with [`Error::InvalidArgument`] before a connection is attempted.
/// `port` is only used for SFTP, FTP always connects to port 21.
pub async fn send_file(
    ftp_method: &str,
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    folder: &str,
    file: FileSource,
) -> Result<()> {
    let endpoint = Endpoint::parse(ftp_method, host, port, user, password, folder)?;
    GdiClient::default().send_file(&endpoint, file).await?;
    Ok(())
}

/// Runs GDI operations through a [`Connector`].
#[derive(Debug, Clone)]
pub struct GdiClient<C = NetworkConnector> {
    connector: C,
    verify_size: bool,
}

impl Default for GdiClient<NetworkConnector> {
    fn default() -> Self {
        Self::new(NetworkConnector::default())
    }
}

impl<C: Connector> GdiClient<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            verify_size: true,
        }
    }

    /// Compare the size the server reports after an upload with the number
    /// of bytes sent. On by default.
    pub fn with_verify_size(mut self, verify_size: bool) -> Self {
        self.verify_size = verify_size;
        self
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Upload `file` as `folder/<file name>`, returning the bytes sent.
    pub async fn send_file(&self, endpoint: &Endpoint, mut file: FileSource) -> Result<u64> {
        let mut session = self.connector.connect(endpoint).await?;
        let result = self.upload(session.as_mut(), endpoint, &mut file).await;
        finish(session, endpoint, result).await
    }

    /// Download every file in `folder` whose name starts with `prefix`
    /// into `local_dir`, optionally deleting each one once it is saved.
    pub async fn download_files(
        &self,
        endpoint: &Endpoint,
        prefix: &str,
        local_dir: &Path,
        delete_after: bool,
    ) -> Result<Vec<PathBuf>> {
        let mut session = self.connector.connect(endpoint).await?;
        let result = download(session.as_mut(), endpoint, prefix, local_dir, delete_after).await;
        finish(session, endpoint, result).await
    }

    /// Delete `folder/filename` if the folder lists it.
    ///
    /// Returns whether a file was deleted.
    pub async fn delete_file(&self, endpoint: &Endpoint, filename: &str) -> Result<bool> {
        let mut session = self.connector.connect(endpoint).await?;
        let result = delete(session.as_mut(), endpoint, filename).await;
        finish(session, endpoint, result).await
    }

    async fn upload(
        &self,
        session: &mut dyn RemoteSession,
        endpoint: &Endpoint,
        file: &mut FileSource,
    ) -> Result<u64> {
        enter(session, endpoint).await?;

        let name = file.name().to_string();
        let remote_path = endpoint.remote_path(&name);
        let sent = session.store(&name, file.reader_mut()).await?;
        info!("Uploaded {} to {remote_path}", format_bytes(sent));

        if self.verify_size {
            match session.size(&name).await? {
                Some(remote) if remote != sent => {
                    return Err(Error::SizeMismatch {
                        path: remote_path,
                        local: sent,
                        remote,
                    });
                }
                Some(remote) => {
                    info!("Local file size: {sent}, remote file size: {remote}");
                }
                None => debug!("Server does not report sizes, skipping size check"),
            }
        }

        Ok(sent)
    }
}

async fn enter(session: &mut dyn RemoteSession, endpoint: &Endpoint) -> Result<()> {
    session.login(endpoint.user(), endpoint.password()).await?;
    session.change_dir(endpoint.folder()).await
}

async fn download(
    session: &mut dyn RemoteSession,
    endpoint: &Endpoint,
    prefix: &str,
    local_dir: &Path,
    delete_after: bool,
) -> Result<Vec<PathBuf>> {
    enter(session, endpoint).await?;

    let mut names: Vec<String> = session
        .list()
        .await?
        .into_iter()
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort();
    debug!("{} file(s) match prefix '{prefix}'", names.len());

    let mut saved = Vec::with_capacity(names.len());
    for name in names {
        let local_path = download_path(local_dir, &name)?;
        let mut local_file = tokio::fs::File::create(&local_path).await?;
        let received = session.retrieve(&name, &mut local_file).await?;
        local_file.flush().await?;
        info!(
            "Downloaded {} to {} ({})",
            endpoint.remote_path(&name),
            local_path.display(),
            format_bytes(received)
        );

        if delete_after {
            session.delete(&name).await?;
            info!("Deleted {}", endpoint.remote_path(&name));
        }
        saved.push(local_path);
    }

    Ok(saved)
}

async fn delete(
    session: &mut dyn RemoteSession,
    endpoint: &Endpoint,
    filename: &str,
) -> Result<bool> {
    enter(session, endpoint).await?;

    if !session.list().await?.iter().any(|name| name == filename) {
        info!("{} not found, nothing to delete", endpoint.remote_path(filename));
        return Ok(false);
    }
    session.delete(filename).await?;
    info!("Deleted {}", endpoint.remote_path(filename));
    Ok(true)
}

/// Close the session and merge the outcome.
///
/// The operation's own error takes precedence; a failed close after a
/// successful operation is only logged.
async fn finish<T>(
    mut session: Box<dyn RemoteSession>,
    endpoint: &Endpoint,
    result: Result<T>,
) -> Result<T> {
    if let Err(e) = session.close().await {
        warn!("Failed to close connection to {}: {e}", endpoint.host());
    }
    result
}
