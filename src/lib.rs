//! Library crate for dirprobe-rs exposing reusable modules.
pub mod aggregator;
pub mod dispatcher;
pub mod error;
pub mod expand;
pub mod generate;
pub mod http;
pub mod target;
pub mod types;
pub mod wordlist;
