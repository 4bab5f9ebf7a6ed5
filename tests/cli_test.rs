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

use clap::Parser;
use std::path::PathBuf;
use vipwrap::TransferMethod;
use vipwrap::cli::{Cli, Commands, FileKindArg};

#[test]
fn test_upload_command_parsing() {
    let cli = Cli::parse_from([
        "vipwrap",
        "-m",
        "FTP",
        "-H",
        "ftp.example.com",
        "-u",
        "vip",
        "-f",
        "/inbound/",
        "upload",
        "85_ORDERS_1_20250102_030405.DAT",
    ]);

    assert_eq!(cli.method, Some(TransferMethod::Ftp));
    assert_eq!(cli.host.as_deref(), Some("ftp.example.com"));
    assert_eq!(cli.folder.as_deref(), Some("/inbound/"));
    match cli.command {
        Commands::Upload { file, remote_name } => {
            assert_eq!(file, PathBuf::from("85_ORDERS_1_20250102_030405.DAT"));
            assert!(remote_name.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_invalid_method_rejected() {
    let result = Cli::try_parse_from(["vipwrap", "-m", "scp", "delete", "a.DAT"]);
    assert!(result.is_err());
}

#[test]
fn test_download_command_parsing() {
    let cli = Cli::parse_from([
        "vipwrap",
        "-c",
        "gdi2",
        "download",
        "EXPORT_",
        "-o",
        "/tmp/inbox",
        "--delete",
    ]);

    assert_eq!(cli.profile.as_deref(), Some("gdi2"));
    match cli.command {
        Commands::Download {
            prefix,
            output_dir,
            delete,
        } => {
            assert_eq!(prefix, "EXPORT_");
            assert_eq!(output_dir, PathBuf::from("/tmp/inbox"));
            assert!(delete);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_global_flags() {
    let cli = Cli::parse_from(["vipwrap", "-vv", "--no-verify-size", "-P", "delete", "a.DAT"]);
    assert_eq!(cli.verbose, 2);
    assert!(cli.no_verify_size);
    assert!(cli.ask_password);
    assert!(matches!(cli.command, Commands::Delete { ref filename } if filename == "a.DAT"));
}

#[test]
fn test_filename_command_parsing() {
    let cli = Cli::parse_from([
        "vipwrap",
        "filename",
        "sales-history",
        "42",
        "--at",
        "20250102_030405",
    ]);

    match cli.command {
        Commands::Filename { kind, id, at } => {
            assert_eq!(kind, FileKindArg::SalesHistory);
            assert_eq!(id, "42");
            assert_eq!(at.as_deref(), Some("20250102_030405"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_endpoint_overrides_from_flags() {
    let cli = Cli::parse_from([
        "vipwrap",
        "-p",
        "2222",
        "--known-hosts",
        "default",
        "--timeout",
        "15",
        "delete",
        "a.DAT",
    ]);
    let overrides = cli.endpoint_overrides();
    assert_eq!(overrides.port, Some(2222));
    assert_eq!(overrides.known_hosts.as_deref(), Some("default"));
    assert_eq!(overrides.timeout, Some(15));
    assert!(overrides.method.is_none());
}
