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

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Which client library carries the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferMethod {
    Ftp,
    Sftp,
}

impl TransferMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferMethod::Ftp => "ftp",
            TransferMethod::Sftp => "sftp",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            TransferMethod::Ftp => 21,
            TransferMethod::Sftp => 22,
        }
    }
}

impl FromStr for TransferMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ftp") {
            Ok(TransferMethod::Ftp)
        } else if s.eq_ignore_ascii_case("sftp") {
            Ok(TransferMethod::Sftp)
        } else {
            Err(Error::invalid_argument(format!(
                "invalid transfer method '{s}', expected 'ftp' or 'sftp'"
            )))
        }
    }
}

impl fmt::Display for TransferMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransferMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransferMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
