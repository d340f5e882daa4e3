//! Context-aware candidate generation.
//!
//! Produces a lazy, deterministic, de-duplicated stream of plausible path
//! strings derived from the target's domain tokens, capped at a configured
//! limit. The combinatorial space is never materialized: stages are chained
//! iterators and `take(limit)` short-circuits the remainder.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::target::TargetDescriptor;

/// Core vocabulary probed against every target regardless of its domain name.
pub const STATIC_VOCAB: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "login",
    "user",
    "member",
    "account",
    "api",
    "v1",
    "v2",
    "beta",
    "staging",
    "dev",
    "developer",
    "test",
    "prod",
    "production",
    "backup",
    "private",
    "db",
    "sql",
    "data",
    "config",
    "conf",
    "settings",
    "install",
    "setup",
    "update",
    "patch",
    "logs",
    "cache",
    "tmp",
    "temp",
    "assets",
    "static",
    "media",
    "images",
    "js",
    "css",
    "lib",
    "vendor",
    "includes",
    "modules",
    "plugins",
    "dashboard",
    "panel",
    "control",
    "cpanel",
    "webmail",
    "server-status",
];

// Fixed year range keeps the stream identical across calls and across days.
const YEARS: std::ops::RangeInclusive<u32> = 2020..=2026;
const YEAR_SEPARATORS: &[&str] = &["", "-", "_"];
const SEPARATORS: &[&str] = &["", "-", "_", "."];
const MODIFIERS: &[&str] = &["bak", "old", "new", "copy", "temp", "archive", "dist"];
const ROLE_SUFFIXES: &[&str] = &["admin", "dev", "test", "backup"];
const PAIR_LEFT: &[&str] = &["admin", "api", "test", "dev"];
const PAIR_RIGHT: &[&str] = &["login", "user", "v1", "db"];
const PAIR_SEPARATORS: &[&str] = &["_", "-"];

/// Lazily generate up to `limit` unique candidate paths for a target.
///
/// Deterministic: two calls with identical inputs yield identical sequences.
/// A descriptor with no extractable tokens (IP hosts) yields the static
/// vocabulary only. `limit == 0` is a configuration error.
pub fn candidates(
    descriptor: &TargetDescriptor,
    limit: usize,
) -> Result<impl Iterator<Item = String>, ConfigError> {
    if limit == 0 {
        return Err(ConfigError::InvalidLimit(0));
    }

    let tokens = descriptor.tokens().to_vec();
    let mut cores: Vec<String> = STATIC_VOCAB.iter().map(|s| (*s).to_string()).collect();
    cores.extend(tokens.iter().cloned());

    let has_tokens = !tokens.is_empty();

    let static_stage = STATIC_VOCAB.iter().map(|s| (*s).to_string());

    let case_stage = tokens.clone().into_iter().flat_map(|t| {
        let variants = vec![t.clone(), capitalize(&t), t.to_ascii_uppercase()];
        variants.into_iter()
    });

    let role_stage = tokens.into_iter().flat_map(|t| {
        ROLE_SUFFIXES.iter().flat_map(move |role| {
            let t = t.clone();
            PAIR_SEPARATORS
                .iter()
                .map(move |sep| format!("{t}{sep}{role}"))
        })
    });

    let year_stage = cores.clone().into_iter().flat_map(|core| {
        YEARS.flat_map(move |year| {
            let core = core.clone();
            YEAR_SEPARATORS
                .iter()
                .map(move |sep| format!("{core}{sep}{year}"))
        })
    });

    let modifier_stage = cores.into_iter().flat_map(|core| {
        SEPARATORS.iter().flat_map(move |sep| {
            let core = core.clone();
            MODIFIERS.iter().map(move |m| format!("{core}{sep}{m}"))
        })
    });

    let pair_stage = PAIR_LEFT.iter().flat_map(|left| {
        PAIR_RIGHT.iter().flat_map(move |right| {
            PAIR_SEPARATORS
                .iter()
                .map(move |sep| format!("{left}{sep}{right}"))
        })
    });

    // Tokenless targets get the static vocabulary only; take(0) means the
    // derived stages are never even polled.
    let derived = case_stage
        .chain(role_stage)
        .chain(year_stage)
        .chain(modifier_stage)
        .chain(pair_stage)
        .take(if has_tokens { usize::MAX } else { 0 });

    let mut seen = HashSet::new();
    Ok(static_stage
        .chain(derived)
        .filter(move |c| seen.insert(c.clone()))
        .take(limit))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
