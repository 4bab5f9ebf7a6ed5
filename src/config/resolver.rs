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

//! Endpoint and connection option resolution.

use std::time::Duration;

use anyhow::{Context, Result};
use zeroize::Zeroizing;

use super::types::{Config, Profile};
use super::utils::{expand_env_vars, expand_tilde};
use crate::sftp::ServerCheckMethod;
use crate::transfer::{ConnectOptions, Endpoint, TransferMethod};

/// Environment variable consulted for the password before any profile.
pub const PASSWORD_ENV: &str = "VIPWRAP_PASSWORD";

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct EndpointOverrides {
    pub method: Option<TransferMethod>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub folder: Option<String>,
    pub known_hosts: Option<String>,
    pub timeout: Option<u64>,
}

static EMPTY_PROFILE: Profile = Profile {
    method: None,
    host: None,
    port: None,
    user: None,
    password: None,
    password_env: None,
    folder: None,
    known_hosts: None,
    host_key: None,
};

impl Config {
    /// Get a profile by name; no name means an empty profile.
    pub fn profile(&self, name: Option<&str>) -> Result<&Profile> {
        let Some(name) = name else {
            return Ok(&EMPTY_PROFILE);
        };
        self.profiles.get(name).ok_or_else(|| {
            let mut available: Vec<_> = self.profiles.keys().cloned().collect();
            available.sort();
            anyhow::anyhow!(
                "Profile '{}' not found in configuration.\nAvailable profiles: {}",
                name,
                available.join(", ")
            )
        })
    }

    pub fn resolve_method(&self, profile: &Profile, cli: &EndpointOverrides) -> TransferMethod {
        cli.method
            .or(profile.method)
            .or(self.defaults.method)
            .unwrap_or(TransferMethod::Sftp)
    }

    /// Password from the command line, [`PASSWORD_ENV`], the profile's
    /// `password_env`, or the profile itself, in that order.
    pub fn resolve_password(
        &self,
        profile: &Profile,
        cli: &EndpointOverrides,
    ) -> Option<Zeroizing<String>> {
        if let Some(password) = &cli.password {
            return Some(Zeroizing::new(password.clone()));
        }
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            tracing::debug!("Using password from {PASSWORD_ENV}");
            return Some(Zeroizing::new(password));
        }
        if let Some(var) = &profile.password_env {
            match std::env::var(var) {
                Ok(password) => return Some(Zeroizing::new(password)),
                Err(_) => tracing::warn!("Password variable {var} is not set"),
            }
        }
        profile.password.clone().map(Zeroizing::new)
    }

    /// Build the endpoint; `password` comes from
    /// [`resolve_password`](Self::resolve_password) or a prompt.
    pub fn resolve_endpoint(
        &self,
        profile: &Profile,
        cli: &EndpointOverrides,
        password: &str,
    ) -> Result<Endpoint> {
        let method = self.resolve_method(profile, cli);
        let host = cli
            .host
            .clone()
            .or_else(|| profile.host.as_deref().map(expand_env_vars))
            .context("No host given. Use --host or select a profile with --profile")?;
        let user = cli
            .user
            .clone()
            .or_else(|| profile.user.as_deref().map(expand_env_vars))
            .context("No user given. Use --user or set 'user' in the profile")?;
        let port = cli
            .port
            .or(profile.port)
            .or(self.defaults.port)
            .unwrap_or(TransferMethod::Sftp.default_port());
        let folder = cli
            .folder
            .clone()
            .or_else(|| profile.folder.as_deref().map(expand_env_vars))
            .or_else(|| self.defaults.folder.as_deref().map(expand_env_vars))
            .unwrap_or_default();

        Ok(Endpoint::new(method, host, port, user, password, folder)?)
    }

    pub fn resolve_connect_options(
        &self,
        profile: &Profile,
        cli: &EndpointOverrides,
    ) -> ConnectOptions {
        let mut options = ConnectOptions::default();
        if let Some(secs) = self.defaults.connect_timeout {
            options.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = cli.timeout.or(self.defaults.command_timeout) {
            options.command_timeout = Duration::from_secs(secs);
        }
        if let Some(port) = self.defaults.ftp_port {
            options.ftp_port = port;
        }

        options.server_check = if cli.known_hosts.is_none()
            && let Some(key) = &profile.host_key
        {
            ServerCheckMethod::PublicKey(key.clone())
        } else {
            match cli
                .known_hosts
                .as_ref()
                .or(profile.known_hosts.as_ref())
                .or(self.defaults.known_hosts.as_ref())
            {
                None => ServerCheckMethod::NoCheck,
                Some(v) if v == "default" => ServerCheckMethod::DefaultKnownHostsFile,
                Some(v) if v == "none" => ServerCheckMethod::NoCheck,
                Some(path) => ServerCheckMethod::KnownHostsFile(
                    expand_tilde(std::path::Path::new(path))
                        .to_string_lossy()
                        .into_owned(),
                ),
            }
        };
        options
    }

    pub fn verify_size(&self) -> bool {
        self.defaults.verify_size.unwrap_or(true)
    }
}
