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

//! Rules for invoice / sales history imports (sequence 90). These post
//! straight to the retailer account; mistakes need a credit to undo.

use once_cell::sync::Lazy;
use regex::Regex;

use super::schema::{Check, FieldRule, Schema};

macro_rules! decimal {
    ($name:ident, $re:literal) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($re).expect("valid regex"));
    };
}

decimal!(ORDER_PRICE, r"^\d{1,6}(\.\d{1,3})?$");
decimal!(ORDER_COST, r"^\d{1,7}(\.\d{1,2})?$");
decimal!(SMALL_AMOUNT, r"^\d{1,5}(\.\d{1,2})?$");
decimal!(DEPLETION_ALLOWANCE, r"^\d{1,6}(\.\d{1,5})?$");

pub static INVOICE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    use Check::*;
    let one_of = |allowed: &'static [&'static str]| [Check::exactly(1), OneOf(allowed)];
    let mut fields = vec![
        FieldRule::required("retailerid", [Check::exactly(5)]),
        FieldRule::required("invoicenumber", [Check::up_to(15), Digits]),
        FieldRule::required("invoicedate", [Date]),
        FieldRule::optional("arstatus", one_of(&["1", "3"])),
        FieldRule::optional("ordertype", one_of(&["S", "T"])),
        FieldRule::required("loadnumber", [Check::exactly(8)]),
        FieldRule::required("driver", [Check::exactly(5)]),
    ];
    for helper in ["helper1", "helper2", "helper3", "helper4", "helper5"] {
        fields.push(FieldRule::optional(helper, [Check::exactly(5)]));
    }
    for column in [
        "company",
        "warehouse",
        "flpgroup",
        "pricegroup",
        "subpricegroup",
        "salesrep",
    ] {
        fields.push(FieldRule::optional(column, [Check::up_to(5)]));
    }
    fields.extend([
        FieldRule::optional("voidflag", one_of(&["Y", "N"])),
        FieldRule::optional("voidreason", [Check::up_to(2)]),
        FieldRule::optional("invoicetype", [Check::exactly(1)]),
        FieldRule::optional("artype", [Check::exactly(1)]),
        FieldRule::optional("trucktype", [Check::exactly(1)]),
        FieldRule::optional("ponumber", [Check::up_to(15)]),
        FieldRule::required("linenumber", [Check::exactly(3), Digits]),
        FieldRule::required("productcode", [Check::exactly(6)]),
        FieldRule::optional(
            "unitofmeasure",
            [Check::exactly(2), OneOf(&["CW", "CB"])],
        ),
        FieldRule::optional("ordermode", one_of(&["0", "1", "2", "3"])),
        FieldRule::optional("orderquantity", [Check::exactly(5), Digits]),
        FieldRule::optional("outquantity", [Check::up_to(5), Digits]),
        FieldRule::optional("onhandquantity", [Check::up_to(7), Digits]),
        FieldRule::optional("partialcasequantity", [Check::up_to(2), Digits]),
        FieldRule::optional("returnreasoncode", [Check::exactly(2)]),
        FieldRule::optional("codedate", [Date]),
        FieldRule::optional("orderprice", [Matches(&ORDER_PRICE)]),
        FieldRule::optional("ordercost", [Matches(&ORDER_COST)]),
        FieldRule::optional("depositamount", [Matches(&SMALL_AMOUNT)]),
        FieldRule::optional("deposittype", [Check::exactly(1)]),
        FieldRule::optional("depletionallowance", [Matches(&DEPLETION_ALLOWANCE)]),
        FieldRule::optional("postoffamount", [Matches(&SMALL_AMOUNT)]),
        FieldRule::optional("discountamount", [Matches(&SMALL_AMOUNT)]),
    ]);
    for level in [
        "discountlevel1",
        "discountlevel2",
        "discountlevel3",
        "discountlevel4",
    ] {
        fields.push(FieldRule::optional(level, [Check::up_to(10)]));
    }
    fields.extend([
        FieldRule::optional("discountlevel", [Check::exactly(1)]),
        FieldRule::optional("specialprice", one_of(&["0", "1"])),
    ]);
    Schema::new("invoice", fields)
});
