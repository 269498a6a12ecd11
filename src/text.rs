//! Text helpers shared by the rule-based components.

use rust_decimal::Decimal;

/// Lower-cased alphanumeric words of `text` (apostrophes kept, so "don't" stays whole).
pub fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '/'))
        .filter(|w| !w.is_empty())
        .map(|w| w.trim_matches('\'').to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Whether `keyword` occurs in `text` as a whole word or phrase.
///
/// Single words also match their simple plural ("payment" matches "payments").
pub fn has_keyword(text: &str, keyword: &str) -> bool {
    let tokens = words(text);
    let key = words(keyword);
    match key.len() {
        0 => false,
        1 => {
            let k = &key[0];
            tokens
                .iter()
                .any(|t| {
                    t == k
                        || t.strip_suffix('s') == Some(k.as_str())
                        || t.strip_suffix("es") == Some(k.as_str())
                })
        }
        n => tokens.windows(n).any(|w| w == key.as_slice()),
    }
}

/// Whether any keyword in `keywords` occurs in `text`.
pub fn has_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| has_keyword(text, k))
}

/// First keyword from `keywords` found in `text`.
pub fn first_match<'a>(text: &str, keywords: &[&'a str]) -> Option<&'a str> {
    keywords.iter().copied().find(|k| has_keyword(text, k))
}

pub fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// Whole dollars with thousands separators, e.g. `$95,000`.
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp(0).to_string();
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("{sign}${out}")
}
