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

//! Upload files to the VIP GDI server over FTP or SFTP.
//!
//! [`send_file`] is the one-call entry point. [`GdiClient`] adds
//! downloads, deletes, size verification and a pluggable [`Connector`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod ftp;
pub mod gdi;
pub mod models;
pub mod sftp;
pub mod transfer;
pub mod utils;

pub use cli::Cli;
pub use config::Config;
pub use error::{Error, Result};
pub use gdi::{GdiClient, send_file};
pub use transfer::{
    ConnectOptions, Connector, Endpoint, FileSource, NetworkConnector, RemoteSession,
    TransferMethod,
};
