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

//! Transfer abstractions shared by the FTP and SFTP paths.
//!
//! A [`Connector`] opens an unauthenticated [`RemoteSession`] for an
//! [`Endpoint`]. Every GDI operation drives the session through
//! `login`, `change_dir` and the actual transfer, and always finishes
//! with `close`.

mod endpoint;
mod method;
mod options;
mod source;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;
use crate::ftp::FtpConnection;
use crate::sftp::SftpConnection;

pub use endpoint::Endpoint;
pub use method::TransferMethod;
pub use options::ConnectOptions;
pub use source::FileSource;

/// One open connection to a remote file server.
#[async_trait]
pub trait RemoteSession: Send {
    async fn login(&mut self, user: &str, password: &str) -> Result<()>;

    /// Make `folder` the base for all following file names.
    /// The folder must already exist.
    async fn change_dir(&mut self, folder: &str) -> Result<()>;

    /// Create or overwrite `name`, returning the number of bytes written.
    async fn store(&mut self, name: &str, reader: &mut (dyn AsyncRead + Send + Unpin))
    -> Result<u64>;

    /// Size reported by the server, `None` if the server cannot tell.
    async fn size(&mut self, name: &str) -> Result<Option<u64>>;

    /// Names of the regular files in the current folder.
    async fn list(&mut self) -> Result<Vec<String>>;

    async fn retrieve(
        &mut self,
        name: &str,
        writer: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64>;

    async fn delete(&mut self, name: &str) -> Result<()>;

    /// Release the connection. Must be safe to call after any failure.
    async fn close(&mut self) -> Result<()>;
}

/// Opens sessions. The seam used to substitute servers in tests.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn RemoteSession>>;
}

/// Connects over the network using the built-in FTP and SFTP clients.
#[derive(Debug, Clone, Default)]
pub struct NetworkConnector {
    options: ConnectOptions,
}

impl NetworkConnector {
    pub fn new(options: ConnectOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }
}

#[async_trait]
impl Connector for NetworkConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn RemoteSession>> {
        match endpoint.method() {
            TransferMethod::Ftp => {
                let port = self.options.ftp_port;
                tracing::info!("Connecting to {}:{} via FTP", endpoint.host(), port);
                let conn = FtpConnection::connect(endpoint.host(), port, &self.options).await?;
                Ok(Box::new(conn))
            }
            TransferMethod::Sftp => {
                tracing::info!(
                    "Connecting to {}:{} via SFTP",
                    endpoint.host(),
                    endpoint.port()
                );
                let conn =
                    SftpConnection::connect(endpoint.host(), endpoint.port(), &self.options)
                        .await?;
                Ok(Box::new(conn))
            }
        }
    }
}
