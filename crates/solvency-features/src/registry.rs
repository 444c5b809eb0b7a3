//! Ratio Registry
//!
//! Central registry of the financial ratios derived from the raw `X*`
//! indicators. The default ratio configuration is built from this table, and
//! the CLI lists it.

/// Available ratio categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatioCategory {
    /// Capital structure (leverage, debt-to-equity)
    Leverage,
    /// Short-term solvency (current ratio)
    Liquidity,
    /// Margins on sales (profit, EBIT, gross)
    Profitability,
    /// Use of assets (asset turnover, receivables, inventory)
    Efficiency,
}

impl RatioCategory {
    /// Lowercase category name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Leverage => "leverage",
            Self::Liquidity => "liquidity",
            Self::Profitability => "profitability",
            Self::Efficiency => "efficiency",
        }
    }
}

impl std::fmt::Display for RatioCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ratio metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatioInfo {
    /// Output column name (unique identifier)
    pub name: &'static str,
    /// Ratio category
    pub category: RatioCategory,
    /// Brief description of what the ratio measures
    pub description: &'static str,
    /// Numerator column
    pub numerator: &'static str,
    /// Denominator column
    pub denominator: &'static str,
    /// Column subtracted from the denominator, if any
    pub denominator_less: Option<&'static str>,
}

impl RatioInfo {
    /// Every raw column the ratio reads.
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut columns = vec![self.numerator, self.denominator];
        columns.extend(self.denominator_less);
        columns
    }

    /// Human-readable formula, e.g. `X18 / (X10 - X18 + eps)`.
    pub fn formula(&self) -> String {
        match self.denominator_less {
            Some(less) => format!(
                "{} / ({} - {} + eps)",
                self.numerator, self.denominator, less
            ),
            None => format!("{} / ({} + eps)", self.numerator, self.denominator),
        }
    }
}

const fn ratio(
    name: &'static str,
    category: RatioCategory,
    description: &'static str,
    numerator: &'static str,
    denominator: &'static str,
) -> RatioInfo {
    RatioInfo {
        name,
        category,
        description,
        numerator,
        denominator,
        denominator_less: None,
    }
}

/// Get all available ratio info, in output column order
pub fn available_ratios() -> Vec<RatioInfo> {
    vec![
        ratio(
            "Leverage_Ratio",
            RatioCategory::Leverage,
            "Total liabilities relative to total assets",
            "X18",
            "X10",
        ),
        ratio(
            "Current_Ratio",
            RatioCategory::Liquidity,
            "Current assets relative to current liabilities",
            "X1",
            "X14",
        ),
        ratio(
            "Profit_Margin",
            RatioCategory::Profitability,
            "Net income per unit of revenue",
            "X6",
            "X17",
        ),
        ratio(
            "Asset_Turnover",
            RatioCategory::Efficiency,
            "Revenue generated per unit of total assets",
            "X17",
            "X10",
        ),
        RatioInfo {
            denominator_less: Some("X18"),
            ..ratio(
                "Debt_to_Equity",
                RatioCategory::Leverage,
                "Total liabilities relative to book equity (assets less liabilities)",
                "X18",
                "X10",
            )
        },
        ratio(
            "EBIT_Margin",
            RatioCategory::Profitability,
            "Operating earnings per unit of revenue",
            "X11",
            "X17",
        ),
        ratio(
            "Gross_Margin",
            RatioCategory::Profitability,
            "Gross profit per unit of revenue",
            "X13",
            "X17",
        ),
        ratio(
            "Receivables_Ratio",
            RatioCategory::Efficiency,
            "Receivables as a share of total assets",
            "X7",
            "X10",
        ),
        ratio(
            "Inventory_Turnover",
            RatioCategory::Efficiency,
            "Cost of goods sold relative to inventory",
            "X2",
            "X5",
        ),
    ]
}
