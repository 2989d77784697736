pub fn is_ascii_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Exchange symbols are short alphanumerics, e.g. `2330`, `0050`, `00878`, `2881A`.
pub fn is_ticker(text: &str) -> bool {
    !text.is_empty() && text.len() <= 8 && text.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Parse an exchange number such as `1,234,567.50`. Placeholders (`--`, `X0.00`)
/// and blanks yield `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
