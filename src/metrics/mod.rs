//! Training-load and risk metrics.

pub mod acwr;
pub mod risk;

pub use acwr::{AcwrCalculator, AcwrStatus, RATIO_CAP};
pub use risk::{adjust_hrv, next_status, RiskAssessment, RiskInputs, HRV_CAP, HRV_FLOOR};
