//! Email address extraction from free text and stored column values.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Conservative address pattern: `local@domain.tld` with a letters-only TLD.
/// The local part allows word characters, dots, hyphens and plus signs.
pub const EMAIL_PATTERN: &str = r"[\w.\-+]+@[\w.\-]+\.[A-Za-z]{2,}";

// Compile-once patterns.
fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern"))
}

fn email_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!("^{}", EMAIL_PATTERN)).expect("email prefix pattern"))
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[;,]\s*").expect("separator pattern"))
}

/// Ordered, de-duplicated addresses embedded anywhere in `text`.
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    email_re()
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|e| !e.is_empty() && seen.insert(e.to_string()))
        .map(str::to_string)
        .collect()
}

/// Splits a stored cell (e.g. `"a@x.com; b@y.org"`) into addresses.
///
/// Each `;`/`,` separated fragment must start with an address; the matched
/// address is kept and any trailing text in the fragment is dropped.
pub fn split_addresses(value: &str) -> Vec<&str> {
    separator_re()
        .split(value.trim())
        .filter(|p| !p.is_empty())
        .filter_map(|p| email_prefix_re().find(p).map(|m| m.as_str()))
        .collect()
}

/// Collects addresses from many cells, first-seen order, no duplicates.
pub fn collect_addresses<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for v in values {
        for addr in split_addresses(v) {
            if seen.insert(addr) {
                out.push(addr.to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_dedups_in_order() {
        let found = extract_emails("send to a@x.com, a@x.com and b@y.org please");
        assert_eq!(found, vec!["a@x.com", "b@y.org"]);
    }

    #[test]
    fn test_extract_empty_and_plain_text() {
        assert!(extract_emails("").is_empty());
        assert!(extract_emails("send this to the IT heads").is_empty());
    }

    #[test]
    fn test_extract_requires_alpha_tld() {
        assert!(extract_emails("user@host.1").is_empty());
        assert_eq!(
            extract_emails("first.last+hr@mail.example.co"),
            vec!["first.last+hr@mail.example.co"]
        );
    }

    #[test]
    fn test_extract_local_part_charset() {
        // '%' is not a local-part character; the match starts after it.
        assert_eq!(extract_emails("a%b@x.com"), vec!["b@x.com"]);
        assert_eq!(extract_emails("ann_lee-1@x.com"), vec!["ann_lee-1@x.com"]);
    }

    #[test]
    fn test_extract_is_case_sensitive_for_dedup() {
        let found = extract_emails("A@x.com a@x.com");
        assert_eq!(found, vec!["A@x.com", "a@x.com"]);
    }

    #[test]
    fn test_split_addresses_separators() {
        assert_eq!(
            split_addresses(" a@x.com;b@y.org,  c@z.net "),
            vec!["a@x.com", "b@y.org", "c@z.net"]
        );
    }

    #[test]
    fn test_split_addresses_skips_non_leading_matches() {
        assert_eq!(split_addresses("n/a; contact a@x.com"), Vec::<&str>::new());
        assert_eq!(split_addresses("a@x.com (primary)"), vec!["a@x.com"]);
    }

    #[test]
    fn test_collect_addresses_dedups_across_cells() {
        let cells = ["a@x.com; b@y.org", "b@y.org", "c@z.net"];
        assert_eq!(
            collect_addresses(cells),
            vec!["a@x.com", "b@y.org", "c@z.net"]
        );
    }
}
