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

//! Server key verification for SSH connections.

use russh::client::Handler;

use crate::error::Error;

/// Server host key verification methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ServerCheckMethod {
    /// Accept any host key
    #[default]
    NoCheck,
    /// Verify against a specific base64 encoded public key
    PublicKey(String),
    /// Verify against a public key file
    PublicKeyFile(String),
    /// Use default known_hosts file (~/.ssh/known_hosts)
    DefaultKnownHostsFile,
    /// Use a specific known_hosts file path
    KnownHostsFile(String),
}

/// SSH client handler for managing server key verification.
#[derive(Debug, Clone)]
pub struct ClientHandler {
    host: String,
    port: u16,
    server_check: ServerCheckMethod,
}

impl ClientHandler {
    pub fn new(host: impl Into<String>, port: u16, server_check: ServerCheckMethod) -> Self {
        Self {
            host: host.into(),
            port,
            server_check,
        }
    }
}

impl Handler for ClientHandler {
    type Error = Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        match &self.server_check {
            ServerCheckMethod::NoCheck => {
                tracing::debug!("Accepting host key of {} without verification", self.host);
                Ok(true)
            }
            ServerCheckMethod::PublicKey(key) => {
                let pk = russh::keys::parse_public_key_base64(key)
                    .map_err(|e| Error::ServerCheckFailed(format!("invalid public key: {e}")))?;

                Ok(pk == *server_public_key)
            }
            ServerCheckMethod::PublicKeyFile(key_file_name) => {
                let pk = russh::keys::load_public_key(key_file_name).map_err(|e| {
                    Error::ServerCheckFailed(format!("cannot load {key_file_name}: {e}"))
                })?;

                Ok(pk == *server_public_key)
            }
            ServerCheckMethod::KnownHostsFile(known_hosts_path) => {
                russh::keys::check_known_hosts_path(
                    &self.host,
                    self.port,
                    server_public_key,
                    known_hosts_path,
                )
                .map_err(|e| {
                    Error::ServerCheckFailed(format!("cannot check {known_hosts_path}: {e}"))
                })
            }
            ServerCheckMethod::DefaultKnownHostsFile => {
                russh::keys::check_known_hosts(&self.host, self.port, server_public_key)
                    .map_err(|e| Error::ServerCheckFailed(format!("cannot check known_hosts: {e}")))
            }
        }
    }
}
