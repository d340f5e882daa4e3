use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Parse wordlist content into a deduplicated list of candidate paths.
///
/// Supported format per line:
/// - one candidate path: `admin/backup`
/// - comments: everything after `#` is ignored
/// - whitespace and blank lines are ignored
pub fn parse_words_str(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut seen = HashSet::new();

    for raw_line in s.lines() {
        let line = raw_line.split('#').next().map(str::trim).unwrap_or("");
        if line.is_empty() {
            continue;
        }
        if seen.insert(line.to_string()) {
            out.push(line.to_string());
        }
    }

    out
}

/// Load candidates from a wordlist file, truncated to `limit`. Errors if the
/// file cannot be read.
pub fn load_words_from_path(path: impl AsRef<Path>, limit: usize) -> Result<Vec<String>, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Wordlist {
        path: path.to_path_buf(),
        source,
    })?;
    let mut words = parse_words_str(&content);
    words.truncate(limit);
    Ok(words)
}

/// Parse a comma-separated extension list into deduplicated tokens.
///
/// Leading dots are stripped (`.php` and `php` are the same extension);
/// tokens must be non-empty and alphanumeric. Empty items between commas are
/// tolerated.
pub fn parse_extensions(s: &str) -> Result<Vec<String>, ConfigError> {
    let mut out: Vec<String> = Vec::new();
    let mut seen = HashSet::new();

    for raw in s.split(',') {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let ext = trimmed.trim_start_matches('.');
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidExtension(trimmed.to_string()));
        }
        if seen.insert(ext.to_string()) {
            out.push(ext.to_string());
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_words_dedup_and_order() {
        let input = "admin\nlogin\nadmin\n  backup  \n";
        let words = parse_words_str(input);
        assert_eq!(words, vec!["admin", "login", "backup"]);
    }

    #[test]
    fn parse_words_skips_comments_and_blanks() {
        let input = r#"
            # common paths
            admin   # panel

            login
        "#;
        let words = parse_words_str(input);
        assert_eq!(words, vec!["admin", "login"]);
    }

    #[test]
    fn extensions_strip_dots_and_dedup() {
        let exts = parse_extensions(".php, html,php,").unwrap();
        assert_eq!(exts, vec!["php", "html"]);
    }

    #[test]
    fn malformed_extensions_rejected() {
        assert!(parse_extensions("php,ht/ml").is_err());
        assert!(parse_extensions(".").is_err());
        assert!(parse_extensions("a b").is_err());
    }

    #[test]
    fn empty_extension_list_is_fine() {
        assert!(parse_extensions("").unwrap().is_empty());
    }

    #[test]
    fn missing_wordlist_file_errors() {
        let err = load_words_from_path("/definitely/not/here.txt", 100);
        assert!(err.is_err());
    }
}
