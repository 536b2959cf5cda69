//! Reactive safety rules.

pub mod catalog;
pub mod engine;

pub use catalog::{default_rules, high_intensity_gate, SafetyRule};
pub use engine::{EngineError, RuleEngine};
