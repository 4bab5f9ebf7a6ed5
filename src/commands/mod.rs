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

//! Subcommand implementations for the `vipwrap` binary.

pub mod delete;
pub mod download;
pub mod filename;
pub mod upload;

use anyhow::{Context, Result};
use zeroize::Zeroizing;

use crate::cli::Cli;
use crate::config::Config;
use crate::gdi::GdiClient;
use crate::transfer::{Endpoint, NetworkConnector};

/// A resolved server plus the client used to reach it.
pub struct Target {
    pub client: GdiClient<NetworkConnector>,
    pub endpoint: Endpoint,
}

/// Resolve endpoint and connection settings from the command line and
/// the configuration file, prompting for a password when none is set.
pub async fn resolve_target(cli: &Cli) -> Result<Target> {
    let config = Config::load_with_priority(cli.config.as_deref()).await?;
    let profile = config.profile(cli.profile.as_deref())?;
    let overrides = cli.endpoint_overrides();

    let password = if cli.ask_password {
        None
    } else {
        config.resolve_password(profile, &overrides)
    };
    let endpoint = config.resolve_endpoint(profile, &overrides, "")?;
    let endpoint = match password {
        Some(password) => endpoint.with_password(password.as_str())?,
        None => {
            tracing::debug!("Using password authentication");
            let password = Zeroizing::new(
                rpassword::prompt_password(format!(
                    "Enter password for {}@{}: ",
                    endpoint.user(),
                    endpoint.host()
                ))
                .with_context(|| "Failed to read password")?,
            );
            endpoint.with_password(password.as_str())?
        }
    };

    let options = config.resolve_connect_options(profile, &overrides);
    let client = GdiClient::new(NetworkConnector::new(options))
        .with_verify_size(config.verify_size() && !cli.no_verify_size);

    Ok(Target { client, endpoint })
}

/// `host:folder (METHOD)` for status lines.
pub(crate) fn describe(endpoint: &Endpoint) -> String {
    format!(
        "{}:{} ({})",
        endpoint.host(),
        if endpoint.folder().is_empty() {
            "~"
        } else {
            endpoint.folder()
        },
        endpoint.method()
    )
}
