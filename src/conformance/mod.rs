//! Cross-implementation conformance.
//!
//! A circuit front end and this crate must agree on every output for the
//! same parameter set. The agreement is pinned by known-answer vector files
//! that both sides run; this module loads and executes them.
//!
//! # Guarantees
//!
//! - Outputs are compared as field elements, so decimal and hex agree
//! - A constants fingerprint in the manifest is checked before any vector
//! - Malformed vectors are reported, never silently skipped

pub mod corpus;

pub use corpus::{
    Corpus, CorpusManifest, CorpusResults, CorpusRunner, Expected, Op, TestResult, TestVector,
};
