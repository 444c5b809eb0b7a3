//! Configuration for the feature pipeline.
//!
//! Column identifiers, ratio formulas and numeric constants are all explicit
//! here instead of being inferred from naming conventions.

use crate::registry::{RatioInfo, available_ratios};
use crate::{FeatureError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default denominator guard.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// How the label mapper treats values outside the label map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    /// Fail on the first unrecognized value
    #[default]
    Strict,
    /// Map unrecognized values to null and log how many there were
    NullOnUnknown,
}

/// Denominator of a ratio feature, before the epsilon guard is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denominator {
    /// A single column
    Column(String),
    /// `minuend - subtrahend`
    Difference {
        /// Column subtracted from
        minuend: String,
        /// Column subtracted
        subtrahend: String,
    },
}

impl Denominator {
    /// Columns read by this denominator.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Column(column) => vec![column.as_str()],
            Self::Difference {
                minuend,
                subtrahend,
            } => vec![minuend.as_str(), subtrahend.as_str()],
        }
    }
}

/// A derived ratio: `numerator / (denominator + epsilon)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioSpec {
    /// Output column name
    pub name: String,
    /// Numerator column
    pub numerator: String,
    /// Denominator expression
    pub denominator: Denominator,
}

impl RatioSpec {
    /// Every column the ratio reads.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.numerator.as_str()];
        columns.extend(self.denominator.columns());
        columns
    }
}

impl From<RatioInfo> for RatioSpec {
    fn from(info: RatioInfo) -> Self {
        let denominator = match info.denominator_less {
            Some(less) => Denominator::Difference {
                minuend: info.denominator.to_string(),
                subtrahend: less.to_string(),
            },
            None => Denominator::Column(info.denominator.to_string()),
        };
        Self {
            name: info.name.to_string(),
            numerator: info.numerator.to_string(),
            denominator,
        }
    }
}

/// Percentile bounds used by winsorization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WinsorizeConfig {
    /// Lower percentile as a fraction (default: 0.05)
    pub lower_pct: f64,
    /// Upper percentile as a fraction (default: 0.95)
    pub upper_pct: f64,
}

impl Default for WinsorizeConfig {
    fn default() -> Self {
        Self {
            lower_pct: 0.05,
            upper_pct: 0.95,
        }
    }
}

/// Configuration for the whole transformation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Target column mapped by the label mapper
    pub target_column: String,
    /// Label value to numeric code
    pub label_map: BTreeMap<String, i32>,
    /// Handling of labels missing from `label_map`
    pub label_policy: LabelPolicy,
    /// Raw numeric indicators; winsorized and standardized
    pub raw_columns: Vec<String>,
    /// Nominal columns replaced by drop-first indicator columns
    pub one_hot_columns: Vec<String>,
    /// Nominal columns replaced in place by their frequency
    pub frequency_columns: Vec<String>,
    /// Derived ratio features, appended in this order
    pub ratios: Vec<RatioSpec>,
    /// Added to every ratio denominator (default: 1e-6)
    pub epsilon: f64,
    /// Winsorization percentiles
    pub winsorize: WinsorizeConfig,
    /// Apply `sign(v) * ln(1 + |v|)` to ratios before standardizing (default: true)
    pub log_compress: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            target_column: "status_label".to_string(),
            label_map: BTreeMap::from([("alive".to_string(), 0), ("failed".to_string(), 1)]),
            label_policy: LabelPolicy::default(),
            raw_columns: (1..=18).map(|i| format!("X{i}")).collect(),
            one_hot_columns: vec!["Division".to_string()],
            frequency_columns: vec!["MajorGroup".to_string()],
            ratios: available_ratios().into_iter().map(RatioSpec::from).collect(),
            epsilon: DEFAULT_EPSILON,
            winsorize: WinsorizeConfig::default(),
            log_compress: true,
        }
    }
}

impl FeatureConfig {
    /// Names of the ratio output columns.
    pub fn ratio_names(&self) -> Vec<String> {
        self.ratios.iter().map(|r| r.name.clone()).collect()
    }

    /// Columns standardized by the scaler: raw columns then ratios, deduplicated.
    pub fn scaled_columns(&self) -> Vec<String> {
        let mut columns = self.raw_columns.clone();
        for name in self.ratio_names() {
            if !columns.contains(&name) {
                columns.push(name);
            }
        }
        columns
    }

    /// Check the configuration for contradictions.
    pub fn validate(&self) -> Result<()> {
        let WinsorizeConfig {
            lower_pct,
            upper_pct,
        } = self.winsorize;
        if !(0.0..=1.0).contains(&lower_pct)
            || !(0.0..=1.0).contains(&upper_pct)
            || lower_pct > upper_pct
        {
            return Err(FeatureError::InvalidConfig(format!(
                "winsorize percentiles must satisfy 0 <= lower <= upper <= 1 (got {lower_pct}, {upper_pct})"
            )));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(FeatureError::InvalidConfig(format!(
                "epsilon must be finite and non-negative (got {})",
                self.epsilon
            )));
        }
        if self.label_map.is_empty() {
            return Err(FeatureError::InvalidConfig("label map is empty".to_string()));
        }
        self.check_column_roles()?;
        let mut names = self.ratio_names();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(FeatureError::InvalidConfig(format!(
                "duplicate ratio name {}",
                pair[0]
            )));
        }
        Ok(())
    }

    /// Each input column plays exactly one role.
    fn check_column_roles(&self) -> Result<()> {
        let roles = std::iter::once(("target", &self.target_column))
            .chain(self.raw_columns.iter().map(|c| ("raw", c)))
            .chain(self.one_hot_columns.iter().map(|c| ("one-hot", c)))
            .chain(self.frequency_columns.iter().map(|c| ("frequency", c)));

        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        for (role, column) in roles {
            if let Some(previous) = seen.insert(column.as_str(), role) {
                return Err(FeatureError::InvalidConfig(format!(
                    "column {column} is listed as both {previous} and {role}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = FeatureConfig::default();
        assert_eq!(config.raw_columns.len(), 18);
        assert_eq!(config.raw_columns[9], "X10");
        assert_eq!(config.ratios.len(), 9);
        assert_eq!(config.label_map.get("failed"), Some(&1));
        assert_eq!(config.scaled_columns().len(), 27);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debt_to_equity_uses_difference() {
        let config = FeatureConfig::default();
        let dte = config
            .ratios
            .iter()
            .find(|r| r.name == "Debt_to_Equity")
            .unwrap();
        assert_eq!(
            dte.denominator,
            Denominator::Difference {
                minuend: "X10".to_string(),
                subtrahend: "X18".to_string(),
            }
        );
        assert_eq!(dte.required_columns(), vec!["X18", "X10", "X18"]);
    }

    #[test]
    fn test_invalid_percentiles_rejected() {
        let config = FeatureConfig {
            winsorize: WinsorizeConfig {
                lower_pct: 0.9,
                upper_pct: 0.1,
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FeatureError::InvalidConfig(_))
        ));
    }

    #[rstest]
    #[case::one_hot_and_frequency(vec!["Division"], vec!["Division", "MajorGroup"], vec![])]
    #[case::nominal_and_raw(vec!["Division"], vec!["MajorGroup"], vec!["Division"])]
    #[case::nominal_is_target(vec!["status_label"], vec!["MajorGroup"], vec![])]
    #[case::frequency_twice(vec!["Division"], vec!["MajorGroup", "MajorGroup"], vec![])]
    fn test_overlapping_roles_rejected(
        #[case] one_hot: Vec<&str>,
        #[case] frequency: Vec<&str>,
        #[case] extra_raw: Vec<&str>,
    ) {
        let mut config = FeatureConfig {
            one_hot_columns: one_hot.into_iter().map(String::from).collect(),
            frequency_columns: frequency.into_iter().map(String::from).collect(),
            ..Default::default()
        };
        config
            .raw_columns
            .extend(extra_raw.into_iter().map(String::from));

        let err = config.validate().unwrap_err();
        assert!(matches!(err, FeatureError::InvalidConfig(_)));
        assert!(err.to_string().contains("listed as both"));
    }

    #[test]
    fn test_negative_epsilon_rejected() {
        let config = FeatureConfig {
            epsilon: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_ratio_rejected() {
        let mut config = FeatureConfig::default();
        let first = config.ratios[0].clone();
        config.ratios.push(first);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_json_roundtrip_keeps_policy() {
        let config = FeatureConfig {
            label_policy: LabelPolicy::NullOnUnknown,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"null_on_unknown\""));
        let back: FeatureConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
