//! Diagnostic ID constants.
//!
//! Generated from `data/diagnostics.json` at build time. Use these instead of
//! string literals so a typo in a code is a compile error.

include!(concat!(env!("OUT_DIR"), "/generated_codes.rs"));
