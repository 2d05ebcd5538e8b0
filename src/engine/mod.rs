//! Sizing & economics engine.
//!
//! Everything under this module is pure computation over already-fetched
//! facts: no network, no filesystem, no clocks. Identical inputs always
//! produce identical output, so the whole pipeline can be tested without
//! mocking.

pub mod catalog;
pub mod designer;
pub mod economics;
pub mod error;
pub mod production;
pub mod sizing;
