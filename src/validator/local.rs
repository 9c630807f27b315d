use std::sync::LazyLock;

use regex::Regex;

/// Dot-separated runs of non-special characters, or a non-empty quoted string.
static LOCAL_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:[^<>()\[\]\\.,;:\s@"]+(?:\.[^<>()\[\]\\.,;:\s@"]+)*|".+")$"#)
        .expect("local-part pattern compiles")
});

pub(crate) fn is_local_valid(local: &str) -> bool {
    LOCAL_PART.is_match(local)
}
