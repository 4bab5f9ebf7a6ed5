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

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::EndpointOverrides;
use crate::models::GdiFileKind;
use crate::transfer::TransferMethod;

fn parse_method(s: &str) -> Result<TransferMethod, String> {
    s.parse().map_err(|e: crate::Error| e.to_string())
}

#[derive(Parser, Debug)]
#[command(
    name = "vipwrap",
    version,
    about = "Upload, download and delete files on the VIP GDI server over FTP or SFTP",
    after_help = concat!(
        "EXAMPLES:\n",
        "  Upload with a profile:       vipwrap -c gdi2 upload 85_ORDERS_1_20250102_030405.DAT\n",
        "  Upload over FTP:             vipwrap -m ftp -H gdi.example.com -u vip -P upload o.DAT\n",
        "  Download and remove exports: vipwrap -c gdi2 download EXPORT_ --delete -o ./inbox\n",
        "  Name a sales history file:   vipwrap filename sales-history 42",
    )
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        env = "VIPWRAP_CONFIG",
        help = "Configuration file path [default: ~/.config/vipwrap/config.yaml]"
    )]
    pub config: Option<PathBuf>,

    #[arg(short = 'c', long, help = "Profile name from the configuration file")]
    pub profile: Option<String>,

    #[arg(
        short = 'm',
        long,
        value_parser = parse_method,
        help = "Transfer method: ftp or sftp [default: sftp]"
    )]
    pub method: Option<TransferMethod>,

    #[arg(short = 'H', long, help = "GDI server host name")]
    pub host: Option<String>,

    #[arg(short = 'p', long, help = "SFTP port [default: 22]; FTP always uses port 21")]
    pub port: Option<u16>,

    #[arg(short = 'u', long, help = "User name on the GDI server")]
    pub user: Option<String>,

    #[arg(
        long,
        help = "Password (visible in the process list; prefer VIPWRAP_PASSWORD or -P)"
    )]
    pub password: Option<String>,

    #[arg(short = 'P', long, help = "Prompt for the password")]
    pub ask_password: bool,

    #[arg(short = 'f', long, help = "Remote folder; must already exist")]
    pub folder: Option<String>,

    #[arg(
        long,
        help = "SSH server key check: 'default' (~/.ssh/known_hosts), 'none', or a known_hosts path"
    )]
    pub known_hosts: Option<String>,

    #[arg(long, help = "Reply / inactivity timeout in seconds [default: 60]")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Skip comparing the remote size after an upload")]
    pub no_verify_size: bool,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Upload a file into the remote folder")]
    Upload {
        #[arg(help = "Local file; its name becomes the remote name")]
        file: PathBuf,

        #[arg(long, help = "Store under this name instead")]
        remote_name: Option<String>,
    },

    #[command(about = "Download every remote file whose name starts with PREFIX")]
    Download {
        #[arg(help = "File name prefix, empty for all files")]
        prefix: String,

        #[arg(short = 'o', long, default_value = ".", help = "Local directory")]
        output_dir: PathBuf,

        #[arg(long, help = "Delete each remote file once it is saved")]
        delete: bool,
    },

    #[command(about = "Delete a file from the remote folder")]
    Delete {
        #[arg(help = "Remote file name")]
        filename: String,
    },

    #[command(about = "Print the GDI file name for an import file")]
    Filename {
        #[arg(value_enum)]
        kind: FileKindArg,

        #[arg(help = "Unique file id, 1 to 10 letters or digits")]
        id: String,

        #[arg(
            long,
            help = "Timestamp as YYYYMMDD_HHMMSS or YYYY-MM-DDTHH:MM:SS [default: now]"
        )]
        at: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKindArg {
    Orders,
    SalesHistory,
}

impl From<FileKindArg> for GdiFileKind {
    fn from(kind: FileKindArg) -> Self {
        match kind {
            FileKindArg::Orders => GdiFileKind::Orders,
            FileKindArg::SalesHistory => GdiFileKind::SalesHistory,
        }
    }
}

impl Cli {
    pub fn endpoint_overrides(&self) -> EndpointOverrides {
        EndpointOverrides {
            method: self.method,
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            folder: self.folder.clone(),
            known_hosts: self.known_hosts.clone(),
            timeout: self.timeout,
        }
    }
}
