//! Display formatting and ordering of currency codes.

use std::collections::BTreeSet;

use crate::error::FormatError;

/// Codes listed first in both selectors, in this order.
pub const POPULAR_CURRENCIES: [&str; 9] =
    ["USD", "EUR", "GBP", "JPY", "AUD", "CAD", "CHF", "CNY", "INR"];

const MIN_FRACTION_DIGITS: usize = 2;
const MAX_FRACTION_DIGITS: usize = 6;

/// Order codes for the selectors: popular codes first in their fixed order,
/// then the rest alphabetically. USD is always included; duplicates dropped.
pub fn sort_currency_codes<I, S>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut all: BTreeSet<String> = codes.into_iter().map(Into::into).collect();
    all.insert("USD".to_string());

    let mut sorted: Vec<String> = POPULAR_CURRENCIES
        .iter()
        .filter(|code| all.contains(**code))
        .map(|code| code.to_string())
        .collect();

    sorted.extend(
        all.into_iter()
            .filter(|code| !POPULAR_CURRENCIES.contains(&code.as_str())),
    );

    sorted
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    let symbol = match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "INR" => "₹",
        "AUD" => "A$",
        "CAD" => "CA$",
        "CNY" => "CN¥",
        "HKD" => "HK$",
        "NZD" => "NZ$",
        "MXN" => "MX$",
        "BRL" => "R$",
        "KRW" => "₩",
        "ILS" => "₪",
        "VND" => "₫",
        "TWD" => "NT$",
        "PHP" => "₱",
        "XAF" => "FCFA",
        "XCD" => "EC$",
        _ => return None,
    };
    Some(symbol)
}

/// Format `amount` the way an en-US currency formatter does: symbol for
/// well-known codes, `"CODE\u{a0}"` prefix otherwise, comma grouping, and two
/// to six fraction digits.
pub fn format_currency(amount: f64, code: &str) -> Result<String, FormatError> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FormatError::UnsupportedCode(code.to_string()));
    }
    if !amount.is_finite() {
        return Err(FormatError::NonFinite);
    }

    let code = code.to_ascii_uppercase();
    let digits = format_digits(amount.abs());
    let sign = if amount < 0.0 && digits.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        "-"
    } else {
        ""
    };

    Ok(match currency_symbol(&code) {
        Some(symbol) => format!("{}{}{}", sign, symbol, digits),
        None => format!("{}{}\u{a0}{}", sign, code, digits),
    })
}

/// [`format_currency`], falling back to `"CODE 0.00"` when formatting fails.
pub fn format_or_fallback(amount: f64, code: &str) -> String {
    match format_currency(amount, code) {
        Ok(formatted) => formatted,
        Err(e) => {
            tracing::debug!("Currency formatting failed, using plain format: {}", e);
            format!("{} {:.2}", code, amount)
        }
    }
}

fn format_digits(amount: f64) -> String {
    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, amount);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < MIN_FRACTION_DIGITS {
        frac.push('0');
    }

    format!("{}.{}", group_thousands(int_part), frac)
}

fn group_thousands(int_part: &str) -> String {
    let len = int_part.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
