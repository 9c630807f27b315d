//! Address grammar check.
//!
//! The grammar is a simplified RFC 5322 subset: a dot-atom or quoted local
//! part, then either a dotted-quad literal or a host name whose last label is
//! alphabetic and at least two characters long. Matching is case-insensitive.

mod domain;
mod local;

use domain::is_domain_valid;
use local::is_local_valid;

/// Returns `true` when `email` matches the accepted address grammar.
///
/// Pure and deterministic: no DNS, no allocation beyond case folding.
pub fn is_syntax_valid(email: &str) -> bool {
    let folded = email.to_lowercase();
    // the domain never contains '@'; a quoted local part may
    let Some((local, domain)) = folded.rsplit_once('@') else {
        return false;
    };
    is_local_valid(local) && is_domain_valid(domain)
}

/// Domain part of `email` (everything after the last `@`), lower-cased.
pub fn domain_of(email: &str) -> Option<String> {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain.trim().to_lowercase())
        .filter(|domain| !domain.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_basic() {
        assert!(is_syntax_valid("alice@example.com"));
        assert!(is_syntax_valid("p@gmail.com"));
        assert!(is_syntax_valid("\"john doe\"@example.org"));
        assert!(is_syntax_valid("user@[10.0.0.1]"));
    }

    #[test]
    fn case_insensitive() {
        assert!(is_syntax_valid("Alice.Smith@Example.COM"));
    }

    #[test]
    fn rejects_common_mistakes() {
        for email in [
            "",
            "p@gmail",
            "invalidsyntax@.com",
            "a@@b.com",
            "no-at-sign.example.com",
            "user@bad",
            "user name@example.com",
            "@example.com",
        ] {
            assert!(!is_syntax_valid(email), "{email}");
        }
    }

    #[test]
    fn domain_of_folds_case() {
        assert_eq!(domain_of("p@GMail.Com").as_deref(), Some("gmail.com"));
        assert_eq!(domain_of("\"a@b\"@Example.org").as_deref(), Some("example.org"));
        assert_eq!(domain_of("nobody"), None);
        assert_eq!(domain_of("trailing@"), None);
    }

    proptest! {
        #[test]
        fn simple_addresses_are_valid(
            local in "[a-z0-9_+-]{1,12}(\\.[a-z0-9_+-]{1,8}){0,2}",
            labels in prop::collection::vec("[a-z0-9-]{1,10}", 1..4),
            tld in "[a-z]{2,6}",
            upper in any::<bool>(),
        ) {
            let email = format!("{local}@{}.{tld}", labels.join("."));
            let email = if upper { email.to_uppercase() } else { email };
            prop_assert!(is_syntax_valid(&email), "{}", email);
        }

        #[test]
        fn missing_at_is_invalid(s in "[^@]{0,40}") {
            prop_assert!(!is_syntax_valid(&s));
        }

        #[test]
        fn short_or_numeric_tld_is_invalid(
            local in "[a-z]{1,8}",
            host in "[a-z]{1,8}",
            tld in "([a-z]|[a-z]{0,3}[0-9][a-z0-9]{0,3})",
        ) {
            let email = format!("{local}@{host}.{tld}");
            prop_assert!(!is_syntax_valid(&email), "{}", email);
        }
    }
}
