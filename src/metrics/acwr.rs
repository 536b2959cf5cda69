//! Acute:Chronic Workload Ratio (ACWR) calculation.
//!
//! Windowed-mean model: acute load is the mean of the most recent short
//! window of daily loads, chronic load the mean of the long window. The
//! ratio is a clinical proxy for injury risk.

use serde::{Deserialize, Serialize};

/// Ceiling applied to the computed ratio.
pub const RATIO_CAP: f64 = 3.0;

/// Ratio reported when there is acute load but no chronic history yet.
const BOOTSTRAP_RATIO: f64 = 2.0;

/// Neutral ratio for an empty history.
const NEUTRAL_RATIO: f64 = 1.0;

/// ACWR classification bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcwrStatus {
    /// ACWR < 0.8: detraining risk.
    Undertrained,
    /// ACWR 0.8 - 1.3: optimal training zone.
    Optimal,
    /// ACWR 1.3 - 1.5: caution zone.
    Caution,
    /// ACWR > 1.5: high injury risk.
    HighRisk,
}

impl AcwrStatus {
    /// Classify a ratio value.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 0.8 {
            AcwrStatus::Undertrained
        } else if ratio <= 1.3 {
            AcwrStatus::Optimal
        } else if ratio <= 1.5 {
            AcwrStatus::Caution
        } else {
            AcwrStatus::HighRisk
        }
    }

    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            AcwrStatus::Undertrained => "Undertrained",
            AcwrStatus::Optimal => "Optimal",
            AcwrStatus::Caution => "Caution",
            AcwrStatus::HighRisk => "High Risk",
        }
    }

    /// Get recommendation text.
    pub fn recommendation(&self) -> &'static str {
        match self {
            AcwrStatus::Undertrained => {
                "Training load is low. Consider increasing training volume gradually."
            }
            AcwrStatus::Optimal => "Training load is in the optimal zone.",
            AcwrStatus::Caution => {
                "Training load is elevated. Monitor for signs of fatigue and plan recovery."
            }
            AcwrStatus::HighRisk => {
                "Training load spike detected. High injury risk. Reduce training intensity."
            }
        }
    }
}

impl std::fmt::Display for AcwrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// ACWR calculator with configurable windows.
#[derive(Debug, Clone, Copy)]
pub struct AcwrCalculator {
    /// Acute window length in days.
    acute_days: usize,
    /// Chronic window length in days.
    chronic_days: usize,
}

impl AcwrCalculator {
    /// Create with the standard 7/28-day windows.
    pub fn new() -> Self {
        Self {
            acute_days: 7,
            chronic_days: 28,
        }
    }

    /// Create with custom window lengths.
    pub fn with_windows(acute_days: usize, chronic_days: usize) -> Self {
        Self {
            acute_days: acute_days.max(1),
            chronic_days: chronic_days.max(1),
        }
    }

    /// Compute the ratio from daily loads ordered oldest to newest.
    ///
    /// An empty history is neutral (1.0). A history no longer than the
    /// acute window has no chronic base yet: with load present it reports
    /// the conservative bootstrap value (2.0), otherwise neutral.
    /// Otherwise the ratio is capped at [`RATIO_CAP`] and rounded to two
    /// decimals.
    pub fn ratio(&self, loads: &[f64]) -> f64 {
        if loads.is_empty() {
            return NEUTRAL_RATIO;
        }

        let acute = window_mean(loads, self.acute_days);
        let chronic = if loads.len() > self.acute_days {
            window_mean(loads, self.chronic_days)
        } else {
            0.0
        };

        if chronic == 0.0 {
            return if acute > 0.0 {
                BOOTSTRAP_RATIO
            } else {
                NEUTRAL_RATIO
            };
        }

        round2((acute / chronic).min(RATIO_CAP))
    }

    /// Ratio plus classification band.
    pub fn assess(&self, loads: &[f64]) -> (f64, AcwrStatus) {
        let ratio = self.ratio(loads);
        (ratio, AcwrStatus::from_ratio(ratio))
    }
}

impl Default for AcwrCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean of the last `window` entries (or all of them if shorter).
fn window_mean(loads: &[f64], window: usize) -> f64 {
    let start = loads.len().saturating_sub(window);
    let tail = &loads[start..];
    tail.iter().sum::<f64>() / tail.len() as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_is_neutral() {
        let calc = AcwrCalculator::new();
        assert_eq!(calc.ratio(&[]), 1.0);
    }

    #[test]
    fn test_bootstrap_first_week() {
        let calc = AcwrCalculator::new();
        // Load with no chronic base reports the conservative bootstrap
        assert_eq!(calc.ratio(&[10.0]), 2.0);
        assert_eq!(calc.ratio(&[10.0; 7]), 2.0);
        // An eighth day establishes a chronic base
        assert_eq!(calc.ratio(&[10.0; 8]), 1.0);
    }

    #[test]
    fn test_zero_load_history_is_neutral() {
        let calc = AcwrCalculator::new();
        assert_eq!(calc.ratio(&[0.0, 0.0, 0.0]), 1.0);
        assert_eq!(calc.ratio(&vec![0.0; 30]), 1.0);
    }

    #[test]
    fn test_spike_week() {
        let calc = AcwrCalculator::new();
        // Seven easy days then one big day.
        let loads = [10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 100.0];
        // acute = (6*10 + 100) / 7, chronic = 170 / 8
        let acute: f64 = 160.0 / 7.0;
        let chronic: f64 = 170.0 / 8.0;
        let expected = ((acute / chronic) * 100.0).round() / 100.0;
        assert_eq!(calc.ratio(&loads), expected);
        assert_eq!(calc.ratio(&loads), 1.08);
    }

    #[test]
    fn test_ratio_cap() {
        let calc = AcwrCalculator::new();
        // 28 quiet days then a massive week: raw ratio far above the cap.
        let mut loads = vec![1.0; 28];
        loads.extend(vec![500.0; 7]);
        assert_eq!(calc.ratio(&loads), 3.0);
    }

    #[test]
    fn test_determinism() {
        let calc = AcwrCalculator::new();
        let loads: Vec<f64> = (1..=40).map(|i| (i % 9) as f64 * 55.0).collect();
        let first = calc.ratio(&loads);
        for _ in 0..100 {
            assert_eq!(calc.ratio(&loads), first);
        }
    }

    #[test]
    fn test_status_bands() {
        assert_eq!(AcwrStatus::from_ratio(0.4), AcwrStatus::Undertrained);
        assert_eq!(AcwrStatus::from_ratio(1.0), AcwrStatus::Optimal);
        assert_eq!(AcwrStatus::from_ratio(1.4), AcwrStatus::Caution);
        assert_eq!(AcwrStatus::from_ratio(2.0), AcwrStatus::HighRisk);
    }

    #[test]
    fn test_assess_pairs_ratio_and_band() {
        let calc = AcwrCalculator::new();
        let mut loads = vec![100.0; 28];
        loads.extend(vec![160.0; 7]);
        let (ratio, status) = calc.assess(&loads);
        assert!(ratio > 1.5);
        assert_eq!(status, AcwrStatus::HighRisk);
    }
}
