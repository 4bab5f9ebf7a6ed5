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

pub async fn download_files(
    target: &Target,
    prefix: &str,
    output_dir: &Path,
    delete_after: bool,
) -> Result<()> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create directory {output_dir:?}"))?;

    println!(
        "{} {} files starting with '{}' from {}",
        "▶".cyan(),
        "Downloading".cyan().bold(),
        prefix.yellow(),
        describe(&target.endpoint).dimmed()
    );

    let saved = target
        .client
        .download_files(&target.endpoint, prefix, output_dir, delete_after)
        .await
        .context("Download failed")?;

    if saved.is_empty() {
        println!("{} no matching files", "•".dimmed());
    }
    for path in &saved {
        println!("  {} {}", "✓".green(), path.display());
    }
    if delete_after && !saved.is_empty() {
        println!(
            "{} {} remote file(s) deleted",
            "•".dimmed(),
            saved.len().to_string().yellow()
        );
    }
    Ok(())
}
