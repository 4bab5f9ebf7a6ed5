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

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

use super::{Target, describe};
use crate::transfer::FileSource;
use crate::utils::format_bytes;

pub async fn upload_file(target: &Target, file: &Path, remote_name: Option<&str>) -> Result<()> {
    let mut source = FileSource::open(file)
        .await
        .with_context(|| format!("Cannot open {}", file.display()))?;
    if let Some(name) = remote_name {
        source = source.with_name(name)?;
    }

    let size = source.len().map_or_else(|| "unknown".to_string(), format_bytes);
    println!(
        "{} {} {} ({}) to {}",
        "▶".cyan(),
        "Uploading".cyan().bold(),
        source.name(),
        size.yellow(),
        describe(&target.endpoint).dimmed()
    );

    let name = source.name().to_string();
    let sent = target
        .client
        .send_file(&target.endpoint, source)
        .await
        .with_context(|| format!("Upload of {name} failed"))?;

    println!(
        "{} {} {}",
        "✓".green(),
        target.endpoint.remote_path(&name).green(),
        format!("({})", format_bytes(sent)).dimmed()
    );
    Ok(())
}
