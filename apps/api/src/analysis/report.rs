//! Analysis Report — the typed shape of one model response.
//!
//! Decoding is strict about presence and type. `check_ranges` then verifies
//! the bounded numbers. Cross-field arithmetic (composite = mean of the four
//! sub-scores, the complexity-adjusted formula, `violations` empty on pass)
//! is the model's contract and is deliberately NOT recomputed here: the
//! engine runs on the other side of the trust boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    Product,
    Service,
    Reseller,
    Platform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintValidation {
    pub passed: bool,
    pub checks_run: u32,
    pub violations: Vec<String>,
}

/// Currency amounts are plain numbers in the firm's reporting currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProjection {
    pub revenue_estimate: f64,
    pub cost_estimate: f64,
    /// May be negative.
    pub profit_margin_pct: f64,
    pub cash_reserve: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarlo {
    pub win_probability_pct: f64, // 0 – 100
    pub best_case_revenue: f64,
    pub worst_case_revenue: f64,
    pub median_revenue: f64,
    pub simulations_run: u32,
}

/// All scores 0.0 – 1.0, lower is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityScore {
    pub composite: f64,
    pub feature_score: f64,
    pub model_score: f64,
    pub strategy_score: f64,
    pub robustness_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgePrediction {
    pub predicted_score: f64,           // 0 – 100
    pub complexity_adjusted_score: f64, // 0 – 100
    pub confidence_pct: f64,            // 0 – 100
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub win_prob_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub best_scenario: Scenario,
    pub worst_scenario: Scenario,
    pub recommended_strategy: String,
}

/// Full quantitative report for one submitted plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub firm_name: String,
    pub business_type: BusinessType,
    pub constraint_validation: ConstraintValidation,
    pub financial_projection: FinancialProjection,
    pub monte_carlo: MonteCarlo,
    pub complexity_score: ComplexityScore,
    pub judge_prediction: JudgePrediction,
    pub scenario_analysis: ScenarioAnalysis,
    /// 3 – 5 by contract; not enforced.
    pub recommendations: Vec<String>,
    pub summary: String,
}

/// A bounded field whose value fell outside its range.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeViolation {
    pub field: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} (expected {}..={})",
            self.field, self.value, self.min, self.max
        )
    }
}

const PERCENT: (f64, f64) = (0.0, 100.0);
const UNIT: (f64, f64) = (0.0, 1.0);

impl AnalysisReport {
    /// Returns every bounded field that is out of range, in schema order.
    /// Empty means the report is displayable.
    pub fn check_ranges(&self) -> Vec<RangeViolation> {
        let mc = &self.monte_carlo;
        let cx = &self.complexity_score;
        let jp = &self.judge_prediction;
        let sa = &self.scenario_analysis;

        let bounded: [(&'static str, f64, (f64, f64)); 11] = [
            ("monte_carlo.win_probability_pct", mc.win_probability_pct, PERCENT),
            ("complexity_score.composite", cx.composite, UNIT),
            ("complexity_score.feature_score", cx.feature_score, UNIT),
            ("complexity_score.model_score", cx.model_score, UNIT),
            ("complexity_score.strategy_score", cx.strategy_score, UNIT),
            ("complexity_score.robustness_score", cx.robustness_score, UNIT),
            ("judge_prediction.predicted_score", jp.predicted_score, PERCENT),
            (
                "judge_prediction.complexity_adjusted_score",
                jp.complexity_adjusted_score,
                PERCENT,
            ),
            ("judge_prediction.confidence_pct", jp.confidence_pct, PERCENT),
            (
                "scenario_analysis.best_scenario.win_prob_pct",
                sa.best_scenario.win_prob_pct,
                PERCENT,
            ),
            (
                "scenario_analysis.worst_scenario.win_prob_pct",
                sa.worst_scenario.win_prob_pct,
                PERCENT,
            ),
        ];

        bounded
            .into_iter()
            .filter(|(_, value, (min, max))| !(*min..=*max).contains(value))
            .map(|(field, value, (min, max))| RangeViolation {
                field,
                value,
                min,
                max,
            })
            .collect()
    }
}
