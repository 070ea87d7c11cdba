//! Output file naming

use once_cell::sync::Lazy;
use regex::Regex;

/// Anything that is not a letter, a number or a plain space
static DISCARDED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N} ]").expect("valid file name regex"));

/// Used when a topic has no alphanumeric characters at all
pub const FALLBACK_FILE_NAME: &str = "banner.jpg";

/// File name for the finished banner
///
/// Keeps letters, numbers and spaces, truncates to `max_len` characters,
/// trims, and joins words with underscores. Combining marks (vowel signs,
/// accents written as separate code points) are not letters and are dropped.
pub fn output_file_name(topic: &str, max_len: usize) -> String {
    let kept: String = DISCARDED
        .replace_all(topic, "")
        .chars()
        .take(max_len)
        .collect();
    let stem = kept.trim().replace(' ', "_");
    if stem.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        format!("{stem}.jpg")
    }
}
