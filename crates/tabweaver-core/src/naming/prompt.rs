//! Naming prompt.

use std::fmt::Write;

use tabweaver_protocols::DomainCount;

use super::LABEL_SEPARATOR;

/// Build the single prompt sent to the model.
///
/// The model is asked for one `DOMAIN|LABEL` line per domain and nothing
/// else; [`parse_labels`](super::parse_labels) tolerates everything it
/// produces anyway.
pub fn build_prompt(domains: &[DomainCount]) -> String {
    let mut listing = String::new();
    for entry in domains {
        let noun = if entry.tab_count == 1 { "tab" } else { "tabs" };
        let _ = writeln!(listing, "{} ({} {})", entry.domain, entry.tab_count, noun);
    }

    format!(
        "You name browser tab groups. Give each of these domain-based tab groups a short, \
meaningful name:

{listing}
Rules:
1. Output exactly one line per domain.
2. Format: DOMAIN{sep}GROUP_NAME
3. DOMAIN must be copied exactly from the list above.
4. GROUP_NAME is a short category of at most 25 characters, using only letters, digits, spaces, & and -.
5. Examples:
github.com{sep}Coding & Dev
youtube.com{sep}Video Content
amazon.com{sep}Shopping
6. Output only the DOMAIN{sep}GROUP_NAME lines, with no explanations.

Start:",
        sep = LABEL_SEPARATOR,
    )
}
