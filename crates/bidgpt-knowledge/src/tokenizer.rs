//! Term extraction for the TF-IDF index.
//!
//! Lowercase, split on anything that is not alphanumeric or `_`, drop
//! single-character tokens, then fold simple English plurals so that
//! "Tenders" and "tender" land on the same term.

/// Split text into index terms, in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|raw| raw.chars().count() >= 2)
        .map(|raw| stem(&raw.to_lowercase()))
        .collect()
}

/// Light plural folding. Tokens of three characters or fewer are kept as-is.
pub fn stem(token: &str) -> String {
    if token.chars().count() <= 3 {
        return token.to_string();
    }
    if let Some(base) = token.strip_suffix("ies") {
        return format!("{base}y");
    }
    if let Some(base) = token.strip_suffix("sses") {
        return format!("{base}ss");
    }
    if token.ends_with('s')
        && !token.ends_with("ss")
        && !token.ends_with("us")
        && !token.ends_with("is")
    {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}
