use crate::cli::SanitizePolicy;
use regex::Regex;
use std::sync::LazyLock;

static RESERVED_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[/\\:]").unwrap());
static NON_WORD_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Turn a post title into a string usable as a single path component.
pub fn sanitize_filename(title: &str, policy: SanitizePolicy) -> String {
    match policy {
        SanitizePolicy::Reserved => {
            let stripped = RESERVED_CHARS.replace_all(title, "");
            WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
        }
        SanitizePolicy::WordOnly => NON_WORD_CHARS.replace_all(title, "").trim().to_string(),
    }
}
