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
use chrono::{Local, NaiveDateTime};

use crate::models::{GdiFileKind, gdi_filename};

const TIMESTAMP_FORMATS: &[&str] = &["%Y%m%d_%H%M%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .with_context(|| {
            format!("Invalid timestamp '{value}', expected YYYYMMDD_HHMMSS or YYYY-MM-DDTHH:MM:SS")
        })
}

/// File name for `kind`, stamped with `at` or the local time.
pub fn file_name(kind: GdiFileKind, id: &str, at: Option<&str>) -> Result<String> {
    let at = match at {
        Some(value) => parse_timestamp(value)?,
        None => Local::now().naive_local(),
    };
    Ok(gdi_filename(kind, id, at)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_with_timestamp() {
        assert_eq!(
            file_name(GdiFileKind::Orders, "7", Some("20250102_030405")).unwrap(),
            "85_ORDERS_7_20250102_030405.DAT"
        );
        assert_eq!(
            file_name(GdiFileKind::SalesHistory, "7", Some("2025-01-02T03:04:05")).unwrap(),
            "90_SALESHISTORY_7_20250102_030405.DAT"
        );
        assert!(file_name(GdiFileKind::Orders, "7", Some("yesterday")).is_err());
    }

    #[test]
    fn test_file_name_now() {
        let name = file_name(GdiFileKind::Orders, "abc", None).unwrap();
        assert!(name.starts_with("85_ORDERS_abc_"));
        assert!(name.ends_with(".DAT"));
    }
}
