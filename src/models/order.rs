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

//! Rules for order imports (sequence 85).

use once_cell::sync::Lazy;
use regex::Regex;

use super::schema::{Check, FieldRule, Schema};

static ORDER_PRICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,9}(\.\d{1,3})?$").expect("valid regex"));
static ORDER_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,7}(\.\d{1,2})?$").expect("valid regex"));

const UNITS_OF_MEASURE: &[&str] = &["CW", "CB"];
const YES_NO: &[&str] = &["Y", "N"];

/// Orders arrive unprocessed in VIP and still have to be run through
/// the usual steps before they reach the warehouse.
pub static ORDER_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    use Check::*;
    Schema::new(
        "order",
        vec![
            FieldRule::optional("loadnumber", [Check::exactly(8)]),
            FieldRule::optional("driver", [Check::exactly(5)]),
            FieldRule::required("retailerid", [Check::exactly(5)]),
            FieldRule::required("linenumber", [Check::exactly(3), Digits]),
            FieldRule::required(
                "unitofmeasure",
                [Check::exactly(2), OneOf(UNITS_OF_MEASURE)],
            ),
            FieldRule::required("productcode", [Check::exactly(6)]),
            FieldRule::required("orderquantity", [Check::exactly(5), Digits]),
            FieldRule::optional("orderprice", [Matches(&ORDER_PRICE)]),
            FieldRule::optional("discountamount", [Matches(&ORDER_AMOUNT)]),
            FieldRule::optional("postoffamount", [Matches(&ORDER_AMOUNT)]),
            FieldRule::optional("depositamount", [Matches(&ORDER_AMOUNT)]),
            FieldRule::optional("specialprice", [Check::exactly(1), OneOf(&["0", "1"])]),
            FieldRule::optional("voidflag", [Check::exactly(1), OneOf(YES_NO)]),
            FieldRule::optional("reasoncode", [Check::exactly(2)]),
            FieldRule::optional("codedate", [Date]),
            FieldRule::required("deliverydate", [Date]),
            FieldRule::optional("ponumber", [Check::up_to(15)]),
            FieldRule::required("company", [Check::up_to(5)]),
            FieldRule::required("warehouse", [Check::up_to(5)]),
            FieldRule::required("ordernumber", [Check::up_to(9)]),
            FieldRule::optional(
                "performancediscountanswer",
                [Check::exactly(1), OneOf(YES_NO)],
            ),
            FieldRule::optional("discountcode", [Check::up_to(10)]),
            FieldRule::optional("discountgroup", [Check::up_to(10)]),
            FieldRule::optional("discountlevel", [Check::exactly(1)]),
            FieldRule::optional("ignoredeliverycharge", [Check::exactly(1), OneOf(YES_NO)]),
            FieldRule::optional("orderdate", [Date]),
            FieldRule::optional("invoicecomments", [Check::up_to(560)]),
            FieldRule::optional("orderaction", [Check::up_to(2)]),
            FieldRule::optional("ordertype", [Check::exactly(1), OneOf(&["S", "T"])]),
            FieldRule::optional("salesrep", [Check::up_to(5)]),
        ],
    )
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    fn order_line() -> Record {
        [
            ("retailerid", "00123"),
            ("linenumber", "001"),
            ("unitofmeasure", "CB"),
            ("productcode", "123456"),
            ("orderquantity", "00010"),
            ("deliverydate", "20250115"),
            ("company", "1"),
            ("warehouse", "10"),
            ("ordernumber", "555"),
            ("orderprice", "24.995"),
            ("ordertype", "S"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_valid_order() {
        assert!(ORDER_SCHEMA.validate(&[order_line()]).is_ok());
    }

    #[test]
    fn test_invalid_order_fields() {
        let mut line = order_line();
        line.insert("unitofmeasure".into(), "EA".into());
        line.insert("orderprice".into(), "1.2345".into());
        line.insert("deliverydate".into(), "20250115 ".into());
        line.remove("ordernumber");

        let columns: Vec<_> = ORDER_SCHEMA
            .violations(&[line])
            .into_iter()
            .map(|v| v.column)
            .collect();
        assert_eq!(
            columns,
            ["unitofmeasure", "orderprice", "deliverydate", "ordernumber"]
        );
    }

    #[test]
    fn test_loadnumber_optional_for_orders() {
        let mut line = order_line();
        line.insert("loadnumber".into(), String::new());
        assert!(ORDER_SCHEMA.violations(&[line]).is_empty());
    }
}
