use std::collections::HashSet;

use dirprobe_rs::expand::expand_all;
use dirprobe_rs::generate::{candidates, STATIC_VOCAB};
use dirprobe_rs::target::TargetDescriptor;

#[test]
fn example_domain_limit_ten_scenario() {
    let d = TargetDescriptor::parse("https://example.com").unwrap();
    let out: Vec<String> = candidates(&d, 10).unwrap().collect();

    assert!(out.len() <= 10);
    let unique: HashSet<&String> = out.iter().collect();
    assert_eq!(unique.len(), out.len());
    assert!(out.contains(&"admin".to_string()));
    assert!(out.contains(&"login".to_string()));
}

#[test]
fn generation_is_restartable() {
    let d = TargetDescriptor::parse("https://shop.example.com/store").unwrap();
    let first: Vec<String> = candidates(&d, 5_000).unwrap().collect();
    let second: Vec<String> = candidates(&d, 5_000).unwrap().collect();
    assert_eq!(first, second);
}

#[test]
fn large_limit_is_bounded_by_the_space_not_by_panic() {
    let d = TargetDescriptor::parse("http://10.1.2.3").unwrap();
    // Tokenless target: the space collapses to the static vocabulary.
    let out: Vec<String> = candidates(&d, 1_000_000).unwrap().collect();
    assert_eq!(out.len(), STATIC_VOCAB.len());
}

#[test]
fn generated_candidates_expand_into_probe_tasks() {
    let d = TargetDescriptor::parse("https://example.com").unwrap();
    let words: Vec<String> = candidates(&d, 4).unwrap().collect();
    let exts = vec!["php".to_string(), "html".to_string()];

    let tasks = expand_all(d.base_url(), words.clone(), &exts);
    assert_eq!(tasks.len(), words.len() * (exts.len() + 1));
    assert!(tasks
        .iter()
        .all(|t| t.url.starts_with("https://example.com/")));
}
