//! Deterministic fallback labels.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{MAX_LABEL_LEN, sanitize_label};

/// Well-known services whose capitalization a plain title-case gets wrong.
static SPECIAL_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("github", "GitHub"),
        ("gitlab", "GitLab"),
        ("youtube", "YouTube"),
        ("linkedin", "LinkedIn"),
        ("stackoverflow", "Stack Overflow"),
        ("stackexchange", "Stack Exchange"),
        ("chatgpt", "ChatGPT"),
        ("openai", "OpenAI"),
        ("paypal", "PayPal"),
        ("ebay", "eBay"),
        ("icloud", "iCloud"),
        ("bbc", "BBC"),
        ("cnn", "CNN"),
        ("nytimes", "NY Times"),
        ("npmjs", "npm"),
        ("x", "X Twitter"),
    ])
});

/// Fallback label for `domain`.
///
/// Derived from the first hostname label (ignoring a leading `www.`),
/// capitalized, with a static table for well-known services. Always a
/// valid label.
pub fn fallback_label(domain: &str) -> String {
    let domain = domain.trim().to_lowercase();
    let host = domain.strip_prefix("www.").unwrap_or(&domain);
    let first = host.split('.').next().unwrap_or_default();

    if let Some(special) = SPECIAL_NAMES.get(first) {
        return (*special).to_string();
    }

    let capitalized = capitalize(first);
    match sanitize_label(&capitalized, MAX_LABEL_LEN) {
        Some(label) => label,
        None => {
            // One usable character or none at all.
            let stem: String = capitalized
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .take(1)
                .collect();
            if stem.is_empty() {
                "Tabs".to_string()
            } else {
                format!("{stem} Tabs")
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
