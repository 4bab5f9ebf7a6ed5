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

//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use super::types::Config;
use super::utils::expand_tilde;

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/vipwrap/config.yaml";

impl Config {
    /// Load configuration from a file. A missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        let expanded_path = expand_tilde(path);

        if !expanded_path.exists() {
            tracing::debug!(
                "Config file not found at {:?}, using defaults",
                expanded_path
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&expanded_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to read configuration file at {}",
                    expanded_path.display()
                )
            })?;

        Self::from_yaml(&content).with_context(|| {
            format!(
                "Failed to parse YAML configuration file at {}",
                expanded_path.display()
            )
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load the file given on the command line, which must exist, or the
    /// default location, which may be missing.
    pub async fn load_with_priority(cli_config_path: Option<&Path>) -> Result<Self> {
        match cli_config_path {
            Some(path) => {
                let expanded = expand_tilde(path);
                if !expanded.exists() {
                    anyhow::bail!("Configuration file {} does not exist", expanded.display());
                }
                tracing::debug!("Using explicitly specified config file: {:?}", expanded);
                Self::load(&expanded).await
            }
            None => Self::load(&PathBuf::from(DEFAULT_CONFIG_PATH)).await,
        }
    }
}
