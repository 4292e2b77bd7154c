//! Strict parser for `DOMAIN|LABEL` model output.

use std::collections::{HashMap, HashSet};

pub const LABEL_SEPARATOR: char = '|';
pub const MAX_LABEL_LEN: usize = 50;
pub const MIN_LABEL_LEN: usize = 2;

/// Why a response line was not used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRejection {
    MissingSeparator,
    EmptyDomain,
    UnknownDomain(String),
    LabelTooShort(String),
    DuplicateDomain(String),
}

impl std::fmt::Display for LineRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineRejection::MissingSeparator => write!(f, "no '{}' separator", LABEL_SEPARATOR),
            LineRejection::EmptyDomain => write!(f, "empty domain"),
            LineRejection::UnknownDomain(d) => write!(f, "domain '{}' was not requested", d),
            LineRejection::LabelTooShort(l) => write!(f, "label '{}' too short after cleanup", l),
            LineRejection::DuplicateDomain(d) => write!(f, "domain '{}' already named", d),
        }
    }
}

/// A rejected response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiagnostic {
    /// 1-based line number in the raw response.
    pub line_no: usize,
    pub line: String,
    pub reason: LineRejection,
}

/// Validated labels plus diagnostics for every rejected line.
#[derive(Debug, Clone, Default)]
pub struct ParsedLabels {
    pub labels: HashMap<String, String>,
    pub diagnostics: Vec<LineDiagnostic>,
}

impl ParsedLabels {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Parse a model response against the requested domains.
///
/// Blank lines are skipped silently. Everything after the first separator
/// is the label. Domains are trimmed and lower-cased and must match a
/// requested domain exactly; the first valid line for a domain wins.
pub fn parse_labels<'a, I>(response: &str, requested: I, max_label_len: usize) -> ParsedLabels
where
    I: IntoIterator<Item = &'a str>,
{
    let requested: HashSet<&str> = requested.into_iter().collect();
    let mut parsed = ParsedLabels::default();

    for (index, raw) in response.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let reject = |reason: LineRejection| LineDiagnostic {
            line_no: index + 1,
            line: line.to_string(),
            reason,
        };

        let Some((domain_raw, label_raw)) = line.split_once(LABEL_SEPARATOR) else {
            parsed.diagnostics.push(reject(LineRejection::MissingSeparator));
            continue;
        };

        let domain = domain_raw.trim().to_lowercase();
        if domain.is_empty() {
            parsed.diagnostics.push(reject(LineRejection::EmptyDomain));
            continue;
        }
        if !requested.contains(domain.as_str()) {
            parsed
                .diagnostics
                .push(reject(LineRejection::UnknownDomain(domain)));
            continue;
        }
        if parsed.labels.contains_key(&domain) {
            parsed
                .diagnostics
                .push(reject(LineRejection::DuplicateDomain(domain)));
            continue;
        }

        match sanitize_label(label_raw, max_label_len) {
            Some(label) => {
                parsed.labels.insert(domain, label);
            }
            None => parsed.diagnostics.push(reject(LineRejection::LabelTooShort(
                label_raw.trim().to_string(),
            ))),
        }
    }

    parsed
}

/// Strip characters outside `[A-Za-z0-9 &-]`, trim, truncate.
///
/// Returns `None` when fewer than [`MIN_LABEL_LEN`] characters survive.
pub fn sanitize_label(raw: &str, max_len: usize) -> Option<String> {
    let max_len = max_len.min(MAX_LABEL_LEN);
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '&' | '-'))
        .collect();

    // Cleaned text is ASCII, so byte truncation is char-safe.
    let mut label = cleaned.trim().to_string();
    label.truncate(max_len);
    let label = label.trim_end().to_string();

    (label.len() >= MIN_LABEL_LEN).then_some(label)
}

/// Whether `label` matches `^[A-Za-z0-9 &-]{2,50}$`.
pub fn is_valid_label(label: &str) -> bool {
    (MIN_LABEL_LEN..=MAX_LABEL_LEN).contains(&label.len())
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '&' | '-'))
}
