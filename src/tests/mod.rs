//! Top-level test-only module: worked scenarios plus property-based checks
//! over the public API, built using nothing but `crate::combinators` and
//! the engine itself.
