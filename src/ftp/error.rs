// Copyright 2025 Lablup Inc. and Jeongkyu Shin
// Copyright 2023 ByteDance and/or its affiliates.
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

use std::io;

use thiserror::Error;

use super::FtpCommand;

/// Wire-level FTP failures.
#[derive(Debug, Error)]
pub enum FtpError {
    #[error("failed to send {0} command: {1}")]
    SendFailed(FtpCommand, #[source] io::Error),
    #[error("failed to read reply: {0}")]
    ReadFailed(#[source] io::Error),
    #[error("connection closed by server")]
    ConnectionClosed,
    #[error("invalid reply line format")]
    InvalidLineFormat,
    #[error("reply line is not valid utf-8")]
    LineIsNotUtf8,
    #[error("reply line too long")]
    LineTooLong,
    #[error("too many lines in multi-line reply")]
    TooManyLines,
    #[error("invalid reply code {0}")]
    InvalidReplyCode(u16),
    #[error("timed out waiting for reply ({0})")]
    ReplyTimedOut(&'static str),
    #[error("service not available: {0}")]
    ServiceNotAvailable(String),
    #[error("not logged in: {0}")]
    NotLoggedIn(String),
    #[error("command {0} not implemented by server")]
    CommandNotImplemented(FtpCommand),
    #[error("invalid syntax in {1} reply to {0}")]
    InvalidReplySyntax(FtpCommand, u16),
    #[error("{cmd} rejected: {code} {message}")]
    FileActionRejected {
        cmd: FtpCommand,
        code: u16,
        message: String,
    },
    #[error("data transfer failed: {0}")]
    DataTransferFailed(String),
    #[error("unexpected reply to {cmd}: {code} {message}")]
    UnexpectedReply {
        cmd: FtpCommand,
        code: u16,
        message: String,
    },
}
