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

//! Error types shared by the FTP and SFTP transfer paths.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::ftp::FtpError;
use crate::models::FieldViolation;

/// Errors returned by every transfer operation.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied parameter was rejected before any network activity.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The TCP connection to the remote host could not be established.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("connection to {address} timed out after {}s", .timeout.as_secs())]
    ConnectTimeout { address: String, timeout: Duration },

    /// The server refused the supplied credentials.
    #[error("authentication failed for user '{user}': {reason}")]
    Authentication { user: String, reason: String },

    #[error("host key verification failed for {host}")]
    HostKeyRejected { host: String },

    #[error("server key check could not be performed: {0}")]
    ServerCheckFailed(String),

    /// The server rejected an operation on a remote path (missing folder,
    /// permission denied, disk full, ...).
    #[error("remote {operation} failed for '{path}': {reason}")]
    RemoteOperation {
        operation: &'static str,
        path: String,
        reason: String,
    },

    #[error("size mismatch for '{path}': sent {local} bytes, remote reports {remote} bytes")]
    SizeMismatch { path: String, local: u64, remote: u64 },

    /// Import records broke one or more column rules.
    #[error("{} invalid value(s) in {schema} records", .violations.len())]
    Validation {
        schema: &'static str,
        violations: Vec<FieldViolation>,
    },

    #[error("FTP error: {0}")]
    Ftp(#[from] FtpError),

    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    #[error("SFTP error: {0}")]
    Sftp(#[from] russh_sftp::client::error::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn remote(
        operation: &'static str,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::RemoteOperation {
            operation,
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure happened before a connection was ever attempted.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    pub fn is_remote_operation(&self) -> bool {
        matches!(self, Error::RemoteOperation { .. })
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
