use crate::error::{KeySolveError, KsResult};
use serde::Serialize;
use std::f64::consts::PI;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Probability of accepting a worse candidate, as a function of the remaining
/// fraction of the run `t` (1.0 at the first generation, approaching 0.0 at the end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, EnumIter, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum AcceptSchedule {
    Always,
    #[default]
    Never,
    Temp,
    Cold,
    /// `(cos((1 - t)π) + 1) / 2`: the cosine runs on elapsed time, so this starts at 1 and ends at 0.
    DropSlow,
    DropFast,
}

impl AcceptSchedule {
    pub fn parse(name: &str) -> KsResult<Self> {
        Self::from_str(name.trim()).map_err(|_| {
            let known: Vec<String> = Self::iter().map(|s| s.to_string()).collect();
            KeySolveError::Config(format!(
                "unknown acceptance schedule '{}' (expected one of: {})",
                name,
                known.join(", ")
            ))
        })
    }

    pub fn probability(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            AcceptSchedule::Always => 1.0,
            AcceptSchedule::Never => 0.0,
            AcceptSchedule::Temp => t,
            AcceptSchedule::Cold => 0.5 * t,
            AcceptSchedule::DropSlow => ((1.0 - t) * PI).cos().mul_add(0.5, 0.5),
            AcceptSchedule::DropFast => (-3.0 * (1.0 - t)).exp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_kebab_case() {
        assert_eq!(AcceptSchedule::parse("drop-slow").unwrap(), AcceptSchedule::DropSlow);
        assert_eq!(AcceptSchedule::DropFast.to_string(), "drop-fast");
    }

    #[test]
    fn drop_slow_starts_hot_and_ends_cold() {
        assert!((AcceptSchedule::DropSlow.probability(1.0) - 1.0).abs() < 1e-12);
        assert!(AcceptSchedule::DropSlow.probability(0.0).abs() < 1e-12);
        assert!(AcceptSchedule::DropSlow.probability(0.75) > 0.75);
    }
}
