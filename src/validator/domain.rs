use std::sync::LazyLock;

use regex::Regex;

/// Either a bracketed dotted-quad literal or dot-separated labels ending in
/// an alphabetic top-level label of two characters or more.
static DOMAIN_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\]|(?:[a-z\-0-9]+\.)+[a-z]{2,})$",
    )
    .expect("domain pattern compiles")
});

/// Expects an already lower-cased domain.
pub(crate) fn is_domain_valid(domain: &str) -> bool {
    DOMAIN_PART.is_match(domain)
}
