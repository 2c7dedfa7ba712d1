//! Expense field extraction.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use tracing::warn;

use crate::extract::DraftRecord;

static CURRENCY_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([$₹€£¥])\s*(\d+(?:\.\d+)?)").unwrap());
static BARE_AMOUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

/// Vendor keyword → category table. First match wins.
static CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "transportation",
        &[
            "uber", "ola", "lyft", "taxi", "cab", "auto", "metro", "bus", "train", "fuel",
            "petrol", "gas",
        ],
    ),
    (
        "food",
        &[
            "swiggy", "zomato", "doordash", "restaurant", "cafe", "coffee", "pizza", "burger",
            "grocery", "groceries",
        ],
    ),
    (
        "shopping",
        &["amazon", "flipkart", "myntra", "store", "mall", "clothes"],
    ),
    (
        "entertainment",
        &["netflix", "spotify", "prime", "movie", "cinema", "game"],
    ),
    (
        "utilities",
        &["electricity", "water", "wifi", "internet", "recharge", "rent", "phone"],
    ),
];

/// Extract an expense draft. Never fails.
///
/// Amount is the first currency-prefixed number, else the first bare number.
/// No number at all means the classifier's contract was violated; the record
/// is still produced, amount `None`, flagged for manual review.
pub fn extract(text: &str, default_currency: &str) -> DraftRecord {
    // The date comes out first so its digits can never be mistaken for
    // the amount.
    let date = ISO_DATE
        .find(text)
        .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok());
    let undated = ISO_DATE.replace(text, "");

    let (amount_span, amount, currency) = match CURRENCY_AMOUNT.captures(&undated) {
        Some(caps) => {
            let whole = caps.get(0).unwrap();
            let symbol = caps.get(1).unwrap().as_str();
            let number = caps.get(2).unwrap().as_str();
            (
                Some(whole.range()),
                Decimal::from_str(number).ok(),
                symbol_to_code(symbol).to_string(),
            )
        }
        None => match BARE_AMOUNT.find(&undated) {
            Some(m) => (
                Some(m.range()),
                Decimal::from_str(m.as_str()).ok(),
                default_currency.to_string(),
            ),
            None => (None, None, default_currency.to_string()),
        },
    };

    let needs_review = amount.is_none();
    if needs_review {
        warn!(text, "Expense text contains no amount; flagging for review");
    }

    // Vendor = text minus the date and the amount span.
    let mut remainder = String::with_capacity(undated.len());
    for (i, c) in undated.char_indices() {
        let in_amount = amount_span
            .as_ref()
            .is_some_and(|span| span.contains(&i));
        if !in_amount {
            remainder.push(c);
        }
    }

    let vendor = remainder
        .trim()
        .trim_matches(|c: char| c == '-' || c == ':' || c == ',')
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let vendor = if vendor.is_empty() {
        "Unknown".to_string()
    } else {
        vendor
    };

    DraftRecord::Expense {
        amount,
        currency,
        category: categorize(&vendor).to_string(),
        vendor,
        date: date.unwrap_or_else(|| Utc::now().date_naive()),
        needs_review,
    }
}

fn symbol_to_code(symbol: &str) -> &'static str {
    match symbol {
        "₹" => "INR",
        "$" => "USD",
        "€" => "EUR",
        "£" => "GBP",
        "¥" => "JPY",
        _ => "USD",
    }
}

fn categorize(vendor: &str) -> &'static str {
    let lower = vendor.to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return category;
        }
    }
    "other"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unwrap_expense(
        draft: DraftRecord,
    ) -> (Option<Decimal>, String, String, String, bool) {
        match draft {
            DraftRecord::Expense {
                amount,
                currency,
                vendor,
                category,
                needs_review,
                ..
            } => (amount, currency, vendor, category, needs_review),
            other => panic!("expected Expense, got {other:?}"),
        }
    }

    #[test]
    fn rupee_uber_ride() {
        let (amount, currency, vendor, category, review) =
            unwrap_expense(extract("₹450 Uber", "INR"));
        assert_eq!(amount, Some(Decimal::from_str("450").unwrap()));
        assert_eq!(currency, "INR");
        assert!(vendor.contains("Uber"));
        assert_eq!(category, "transportation");
        assert!(!review);
    }

    #[test]
    fn dollar_amount_with_decimals() {
        let (amount, currency, _, _, _) = unwrap_expense(extract("$12.50 coffee", "INR"));
        assert_eq!(amount, Some(Decimal::from_str("12.50").unwrap()));
        assert_eq!(currency, "USD");
    }

    #[test]
    fn bare_number_uses_default_currency() {
        let (amount, currency, vendor, _, _) =
            unwrap_expense(extract("450 swiggy dinner", "INR"));
        assert_eq!(amount, Some(Decimal::from_str("450").unwrap()));
        assert_eq!(currency, "INR");
        assert!(vendor.to_lowercase().contains("swiggy"));
    }

    #[test]
    fn currency_prefixed_wins_over_earlier_bare_number() {
        let (amount, currency, _, _, _) = unwrap_expense(extract("2 tickets $30 cinema", "INR"));
        assert_eq!(amount, Some(Decimal::from_str("30").unwrap()));
        assert_eq!(currency, "USD");
    }

    #[test]
    fn no_amount_flags_for_review() {
        let (amount, _, vendor, _, review) = unwrap_expense(extract("paid for groceries", "INR"));
        assert_eq!(amount, None);
        assert!(review);
        assert!(vendor.contains("groceries"));
    }

    #[test]
    fn empty_vendor_defaults_to_unknown() {
        let (_, _, vendor, category, _) = unwrap_expense(extract("₹100", "INR"));
        assert_eq!(vendor, "Unknown");
        assert_eq!(category, "other");
    }

    #[test]
    fn iso_date_is_stripped_from_vendor_and_parsed() {
        let draft = extract("₹300 Amazon 2025-02-14", "INR");
        match draft {
            DraftRecord::Expense { vendor, date, category, .. } => {
                assert_eq!(vendor, "Amazon");
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 2, 14).unwrap());
                assert_eq!(category, "shopping");
            }
            other => panic!("expected Expense, got {other:?}"),
        }
    }

    #[test]
    fn leading_date_year_is_not_taken_as_amount() {
        let draft = extract("2025-02-14 lunch bill 450", "INR");
        match draft {
            DraftRecord::Expense {
                amount,
                vendor,
                date,
                ..
            } => {
                assert_eq!(amount, Some(Decimal::from_str("450").unwrap()));
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 2, 14).unwrap());
                assert!(!vendor.contains("2025"), "vendor: {vendor}");
                assert!(vendor.contains("lunch bill"), "vendor: {vendor}");
            }
            other => panic!("expected Expense, got {other:?}"),
        }
    }

    #[test]
    fn missing_date_defaults_to_today() {
        let draft = extract("₹50 chai", "INR");
        match draft {
            DraftRecord::Expense { date, .. } => assert_eq!(date, Utc::now().date_naive()),
            other => panic!("expected Expense, got {other:?}"),
        }
    }

    #[test]
    fn category_lookup_covers_tables() {
        for (text, expected) in [
            ("₹200 zomato", "food"),
            ("₹99 netflix", "entertainment"),
            ("₹500 electricity", "utilities"),
            ("₹150 ola", "transportation"),
            ("₹80 somewhere", "other"),
        ] {
            let (_, _, _, category, _) = unwrap_expense(extract(text, "INR"));
            assert_eq!(category, expected, "text: {text}");
        }
    }
}
