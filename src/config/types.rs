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

//! Configuration types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::transfer::TransferMethod;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Settings shared by every profile.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Defaults {
    pub method: Option<TransferMethod>,
    /// SFTP port.
    pub port: Option<u16>,
    /// FTP control port.
    pub ftp_port: Option<u16>,
    pub folder: Option<String>,
    /// Seconds.
    pub connect_timeout: Option<u64>,
    /// Seconds.
    pub command_timeout: Option<u64>,
    /// `default` for `~/.ssh/known_hosts`, otherwise a path.
    pub known_hosts: Option<String>,
    pub verify_size: Option<bool>,
}

/// One GDI account.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Profile {
    pub method: Option<TransferMethod>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Name of an environment variable holding the password.
    pub password_env: Option<String>,
    pub folder: Option<String>,
    pub known_hosts: Option<String>,
    /// Base64 server public key; wins over `known_hosts`.
    pub host_key: Option<String>,
}
