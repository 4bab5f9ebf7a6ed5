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

use anyhow::Result;
use clap::Parser;

use vipwrap::{
    cli::{Cli, Commands},
    commands::{
        delete::delete_file, download::download_files, filename::file_name, resolve_target,
        upload::upload_file,
    },
    utils::init_logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Commands::Filename { kind, id, at } = &cli.command {
        println!("{}", file_name((*kind).into(), id, at.as_deref())?);
        return Ok(());
    }

    let target = resolve_target(&cli).await?;
    match &cli.command {
        Commands::Upload { file, remote_name } => {
            upload_file(&target, file, remote_name.as_deref()).await
        }
        Commands::Download {
            prefix,
            output_dir,
            delete,
        } => download_files(&target, prefix, output_dir, *delete).await,
        Commands::Delete { filename } => delete_file(&target, filename).await,
        Commands::Filename { .. } => Ok(()),
    }
}
