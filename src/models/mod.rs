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

//! GDI import files: naming and record validation.

mod invoice;
mod order;
mod schema;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::error::{Error, Result};

pub use invoice::INVOICE_SCHEMA;
pub use order::ORDER_SCHEMA;
pub use schema::{Check, FieldRule, FieldViolation, MAX_DATE, MIN_DATE, Record, Schema};

/// The kinds of import files GDI accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GdiFileKind {
    Orders,
    SalesHistory,
}

impl GdiFileKind {
    pub fn sequence(self) -> u32 {
        match self {
            GdiFileKind::Orders => 85,
            GdiFileKind::SalesHistory => 90,
        }
    }

    pub fn data_type(self) -> &'static str {
        match self {
            GdiFileKind::Orders => "ORDERS",
            GdiFileKind::SalesHistory => "SALESHISTORY",
        }
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            GdiFileKind::Orders => &ORDER_SCHEMA,
            GdiFileKind::SalesHistory => &INVOICE_SCHEMA,
        }
    }
}

impl fmt::Display for GdiFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.data_type())
    }
}

impl FromStr for GdiFileKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "orders" | "order" | "85" => Ok(GdiFileKind::Orders),
            "saleshistory" | "sales-history" | "invoices" | "invoice" | "90" => {
                Ok(GdiFileKind::SalesHistory)
            }
            _ => Err(Error::invalid_argument(format!(
                "unknown GDI file kind '{s}'"
            ))),
        }
    }
}

/// `SEQUENCE_DATATYPE_ID_YYYYMMDD_HHMMSS.DAT`.
///
/// `id` must be 1 to 10 ASCII letters or digits and should be unique per
/// file.
pub fn gdi_filename(kind: GdiFileKind, id: &str, at: NaiveDateTime) -> Result<String> {
    if id.is_empty() || id.len() > 10 || !id.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(Error::invalid_argument(format!(
            "file id '{id}' must be 1 to 10 letters or digits"
        )));
    }
    Ok(format!(
        "{}_{}_{}_{}.DAT",
        kind.sequence(),
        kind.data_type(),
        id,
        at.format("%Y%m%d_%H%M%S")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_gdi_filename() {
        assert_eq!(
            gdi_filename(GdiFileKind::Orders, "A1", at()).unwrap(),
            "85_ORDERS_A1_20250102_030405.DAT"
        );
        assert_eq!(
            gdi_filename(GdiFileKind::SalesHistory, "0123456789", at()).unwrap(),
            "90_SALESHISTORY_0123456789_20250102_030405.DAT"
        );
    }

    #[test]
    fn test_gdi_filename_rejects_bad_ids() {
        for id in ["", "01234567890", "a_b", "ä"] {
            assert!(
                gdi_filename(GdiFileKind::Orders, id, at())
                    .unwrap_err()
                    .is_invalid_argument()
            );
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("ORDERS".parse::<GdiFileKind>().unwrap(), GdiFileKind::Orders);
        assert_eq!(
            "sales-history".parse::<GdiFileKind>().unwrap(),
            GdiFileKind::SalesHistory
        );
        assert!("returns".parse::<GdiFileKind>().is_err());
        assert_eq!(GdiFileKind::SalesHistory.schema().name(), "invoice");
    }
}
