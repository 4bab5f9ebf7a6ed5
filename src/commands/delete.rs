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

use super::Target;

pub async fn delete_file(target: &Target, filename: &str) -> Result<()> {
    let remote_path = target.endpoint.remote_path(filename);
    let deleted = target
        .client
        .delete_file(&target.endpoint, filename)
        .await
        .with_context(|| format!("Failed to delete {remote_path}"))?;

    if deleted {
        println!("{} deleted {}", "✓".green(), remote_path);
    } else {
        println!("{} {} not found", "•".dimmed(), remote_path.yellow());
    }
    Ok(())
}
