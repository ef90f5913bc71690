//! discheck - check whether a domain resolves to a discounted IP address.
//!
//! A domain is extracted from free-form input, resolved through an ordered
//! list of DNS-over-HTTPS providers and looked up in a preloaded IP list.
//! Successful checks are kept in a small history file.
//!
//! ```text
//! input ─▶ extract_domain ─▶ DohResolver ─▶ IpSet::contains ─▶ CheckResult
//!                              │                                   │
//!                  cloudflare ─┤ A + AAAA, in parallel             ▼
//!                  google ─────┘ next provider on failure     HistoryStore
//! ```

pub mod args;
pub mod checker;
pub mod config;
pub mod dnslib;
pub mod errors;
pub mod history;
pub mod iplist;
pub mod structs;
pub mod subnets;
pub mod telemetry;
pub mod utils;

pub use checker::Checker;
pub use config::Config;
pub use errors::Error;
