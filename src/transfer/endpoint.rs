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

use std::fmt;

use zeroize::Zeroizing;

use super::TransferMethod;
use crate::error::{Error, Result};

/// Values that end up on an FTP command line must stay on one line.
fn single_line(field: &str, value: &str) -> Result<()> {
    if value.contains(['\r', '\n']) {
        return Err(Error::invalid_argument(format!(
            "{field} must not contain line breaks"
        )));
    }
    Ok(())
}

/// Everything needed to reach one remote folder.
#[derive(Clone)]
pub struct Endpoint {
    method: TransferMethod,
    host: String,
    port: u16,
    user: String,
    password: Zeroizing<String>,
    folder: String,
}

impl Endpoint {
    /// Validate and build an endpoint. `port` is only used for SFTP.
    pub fn new(
        method: TransferMethod,
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        folder: impl Into<String>,
    ) -> Result<Self> {
        let host = host.into().trim().to_string();
        if host.is_empty() {
            return Err(Error::invalid_argument("host must not be empty"));
        }
        if method == TransferMethod::Sftp && port == 0 {
            return Err(Error::invalid_argument("SFTP port must not be 0"));
        }
        let user = user.into();
        single_line("user", &user)?;
        let password = Zeroizing::new(password.into());
        single_line("password", &password)?;
        let folder = folder.into();
        single_line("folder", &folder)?;

        Ok(Self {
            method,
            host,
            port,
            user,
            password,
            folder,
        })
    }

    /// Same as [`Endpoint::new`] with the method given as text
    /// (`"ftp"` or `"sftp"`, any case).
    pub fn parse(
        ftp_method: &str,
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        folder: impl Into<String>,
    ) -> Result<Self> {
        let method = ftp_method.parse()?;
        Self::new(method, host, port, user, password, folder)
    }

    pub fn method(&self) -> TransferMethod {
        self.method
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Same endpoint with another password.
    pub fn with_password(mut self, password: impl Into<String>) -> Result<Self> {
        let password = Zeroizing::new(password.into());
        single_line("password", &password)?;
        self.password = password;
        Ok(self)
    }

    /// `folder/name` as shown in logs and errors.
    pub fn remote_path(&self, name: &str) -> String {
        if self.folder.is_empty() || self.folder.ends_with('/') {
            format!("{}{name}", self.folder)
        } else {
            format!("{}/{name}", self.folder)
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("folder", &self.folder)
            .finish()
    }
}
