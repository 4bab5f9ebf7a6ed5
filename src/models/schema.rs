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

//! Column rules for tabular GDI import records.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

/// One row of an import file, keyed by lower-case column name.
pub type Record = HashMap<String, String>;

/// Lowest and highest `YYYYMMDD` value accepted in date columns.
pub const MIN_DATE: u32 = 1970_01_01;
pub const MAX_DATE: u32 = 2099_12_31;

/// A single constraint on a column value.
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// Length in characters, both ends inclusive.
    Length { min: usize, max: usize },
    /// ASCII digits only.
    Digits,
    OneOf(&'static [&'static str]),
    Matches(&'static Regex),
    /// Eight digits forming a number between [`MIN_DATE`] and [`MAX_DATE`].
    Date,
}

impl Check {
    pub const fn exactly(len: usize) -> Self {
        Check::Length { min: len, max: len }
    }

    pub const fn up_to(max: usize) -> Self {
        Check::Length { min: 1, max }
    }

    /// Reason the value fails this check, if it does.
    fn violation(&self, value: &str) -> Option<String> {
        match *self {
            Check::Length { min, max } => {
                let len = value.chars().count();
                if len < min || len > max {
                    return Some(if min == max {
                        format!("length {len}, expected {min}")
                    } else {
                        format!("length {len}, expected {min} to {max}")
                    });
                }
            }
            Check::Digits => {
                if !value.bytes().all(|b| b.is_ascii_digit()) {
                    return Some("expected digits only".to_string());
                }
            }
            Check::OneOf(allowed) => {
                if !allowed.contains(&value) {
                    return Some(format!("expected one of {}", allowed.join(", ")));
                }
            }
            Check::Matches(re) => {
                if !re.is_match(value) {
                    return Some(format!("does not match {}", re.as_str()));
                }
            }
            Check::Date => {
                let in_range = value.len() == 8
                    && value.bytes().all(|b| b.is_ascii_digit())
                    && value
                        .parse::<u32>()
                        .is_ok_and(|d| (MIN_DATE..=MAX_DATE).contains(&d));
                if !in_range {
                    return Some(format!("expected YYYYMMDD between {MIN_DATE} and {MAX_DATE}"));
                }
            }
        }
        None
    }
}

/// Rules for one column.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: &'static str,
    pub required: bool,
    pub checks: Vec<Check>,
}

impl FieldRule {
    pub fn required(name: &'static str, checks: impl Into<Vec<Check>>) -> Self {
        Self {
            name,
            required: true,
            checks: checks.into(),
        }
    }

    pub fn optional(name: &'static str, checks: impl Into<Vec<Check>>) -> Self {
        Self {
            name,
            required: false,
            checks: checks.into(),
        }
    }
}

/// A column value that broke a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Zero-based row index.
    pub row: usize,
    pub column: &'static str,
    /// `None` when a required column is missing or empty.
    pub value: Option<String>,
    pub reason: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(
                f,
                "row {}, column {}: '{value}' {}",
                self.row, self.column, self.reason
            ),
            None => write!(f, "row {}, column {}: {}", self.row, self.column, self.reason),
        }
    }
}

/// A named set of column rules. Columns without a rule are ignored.
#[derive(Debug, Clone)]
pub struct Schema {
    name: &'static str,
    fields: Vec<FieldRule>,
}

impl Schema {
    pub fn new(name: &'static str, fields: Vec<FieldRule>) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check one row. Empty values count as absent.
    pub fn row_violations(&self, row: usize, record: &Record) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        for field in &self.fields {
            let value = record
                .get(field.name)
                .map(String::as_str)
                .filter(|v| !v.is_empty());
            let Some(value) = value else {
                if field.required {
                    violations.push(FieldViolation {
                        row,
                        column: field.name,
                        value: None,
                        reason: "required value is missing".to_string(),
                    });
                }
                continue;
            };
            // report only the first failing check per column
            if let Some(reason) = field.checks.iter().find_map(|c| c.violation(value)) {
                violations.push(FieldViolation {
                    row,
                    column: field.name,
                    value: Some(value.to_string()),
                    reason,
                });
            }
        }
        violations
    }

    pub fn violations(&self, records: &[Record]) -> Vec<FieldViolation> {
        records
            .iter()
            .enumerate()
            .flat_map(|(row, record)| self.row_violations(row, record))
            .collect()
    }

    /// Fail with [`Error::Validation`](crate::Error::Validation) when any
    /// record breaks a rule.
    pub fn validate(&self, records: &[Record]) -> crate::Result<()> {
        let violations = self.violations(records);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(crate::Error::Validation {
                schema: self.name,
                violations,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static PRICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}(\.\d{1,2})?$").unwrap());

    fn schema() -> Schema {
        Schema::new(
            "test",
            vec![
                FieldRule::required("code", [Check::exactly(3), Check::Digits]),
                FieldRule::optional("flag", [Check::OneOf(&["Y", "N"])]),
                FieldRule::optional("price", [Check::Matches(&PRICE)]),
                FieldRule::optional("when", [Check::Date]),
            ],
        )
    }

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_valid_record() {
        let rec = record(&[("code", "007"), ("flag", "Y"), ("price", "12.5"), ("extra", "x")]);
        assert!(schema().violations(&[rec]).is_empty());
    }

    #[test]
    fn test_missing_and_empty_required() {
        let violations = schema().violations(&[record(&[]), record(&[("code", "")])]);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[1].row, 1);
        assert_eq!(violations[1].column, "code");
        assert_eq!(violations[1].value, None);
    }

    #[test]
    fn test_first_failing_check_reported() {
        let violations = schema().row_violations(0, &record(&[("code", "12a4")]));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].reason, "length 4, expected 3");

        let violations = schema().row_violations(0, &record(&[("code", "1a4")]));
        assert_eq!(violations[0].reason, "expected digits only");
    }

    #[test]
    fn test_optional_checks() {
        let rec = record(&[
            ("code", "123"),
            ("flag", "y"),
            ("price", "1234"),
            ("when", "19691231"),
        ]);
        let columns: Vec<_> = schema()
            .row_violations(0, &rec)
            .into_iter()
            .map(|v| v.column)
            .collect();
        assert_eq!(columns, ["flag", "price", "when"]);
    }

    #[test]
    fn test_date_bounds() {
        assert!(Check::Date.violation("19700101").is_none());
        assert!(Check::Date.violation("20991231").is_none());
        assert!(Check::Date.violation("21000101").is_some());
        assert!(Check::Date.violation("2025-01-01").is_some());
        assert!(Check::Date.violation("+2025010").is_some());
    }

    #[test]
    fn test_validate_error() {
        let err = schema().validate(&[record(&[("code", "1")])]).unwrap_err();
        match err {
            crate::Error::Validation { schema, violations } => {
                assert_eq!(schema, "test");
                assert_eq!(violations.len(), 1);
                assert_eq!(
                    violations[0].to_string(),
                    "row 0, column code: '1' length 1, expected 3"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
