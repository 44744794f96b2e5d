use serde::{Deserialize, Serialize};

use super::Snapshot;

/// Percentage change from `previous` to `current`, rounded to two decimals.
///
/// Returns 0.0 when there is no previous value or the change is undefined
/// (previous of zero, non-finite inputs).
pub fn percent_change(previous: Option<f64>, current: f64) -> f64 {
    let Some(previous) = previous else {
        return 0.0;
    };
    let change = (current - previous) / previous * 100.0;
    if !change.is_finite() {
        return 0.0;
    }
    (change * 100.0).round() / 100.0
}

/// Trends of the generation figures between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerTrends {
    pub solar: f64,
    pub wind: f64,
    pub total: f64,
}

impl PowerTrends {
    pub fn between(previous: Option<&Snapshot>, current: &Snapshot) -> Self {
        let prev = previous.map(|s| &s.power_generation);
        let now = &current.power_generation;

        Self {
            solar: percent_change(prev.map(|p| p.solar_power()), now.solar_power()),
            wind: percent_change(prev.map(|p| p.wind_power()), now.wind_power()),
            total: percent_change(prev.map(|p| p.total_power()), now.total_power()),
        }
    }

    pub fn flat() -> Self {
        Self {
            solar: 0.0,
            wind: 0.0,
            total: 0.0,
        }
    }
}
