//! Execution result aggregation
//!
//! Reduces the hits of one evaluation to a total score, a final action,
//! and a final flag.

use crate::runtime::Hit;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Action returned when no rule fired
pub const DEFAULT_ACTION: &str = "APPROVE";

/// Aggregated result of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    /// Every hit produced during the run
    pub hits: Vec<Hit>,

    /// Sum of all hit scores, zero when none fired
    pub total_score: BigDecimal,

    /// Highest-ranked action among the hits
    pub final_action: String,

    /// Flag of the highest-scoring hit carrying one
    pub final_flag: Option<String>,
}

impl EvaluationOutcome {
    /// The empty, zero-score outcome returned when nothing fired or no
    /// container exists for the record type
    pub fn empty() -> Self {
        Self {
            hits: Vec::new(),
            total_score: BigDecimal::default(),
            final_action: DEFAULT_ACTION.to_string(),
            final_flag: None,
        }
    }
}

/// Fixed total order over action tags
///
/// REJECT(5) > REVIEW(4) > FLAG(3) > HOLD(2) > APPROVE(1); unrecognized
/// tags rank below APPROVE and never displace a ranked action.
fn action_rank(action: &str) -> u8 {
    match action.trim().to_ascii_uppercase().as_str() {
        "REJECT" => 5,
        "REVIEW" => 4,
        "FLAG" => 3,
        "HOLD" => 2,
        "APPROVE" => 1,
        _ => 0,
    }
}

/// Aggregate the accumulated hits of one evaluation
pub fn aggregate(hits: Vec<Hit>) -> EvaluationOutcome {
    let total_score = hits
        .iter()
        .fold(BigDecimal::default(), |sum, hit| sum + &hit.score);

    let mut final_action = DEFAULT_ACTION.to_string();
    let mut final_rank = action_rank(DEFAULT_ACTION);
    for hit in &hits {
        let rank = action_rank(&hit.action);
        if rank > final_rank {
            final_action = hit.action.clone();
            final_rank = rank;
        }
    }

    // Highest-scoring hit with a non-empty flag; strict comparison keeps
    // the first hit on ties
    let mut final_flag: Option<(&BigDecimal, &str)> = None;
    for hit in &hits {
        if let Some(flag) = hit.flag.as_deref().filter(|f| !f.is_empty()) {
            if final_flag.map_or(true, |(best, _)| hit.score > *best) {
                final_flag = Some((&hit.score, flag));
            }
        }
    }
    let final_flag = final_flag.map(|(_, flag)| flag.to_string());

    EvaluationOutcome {
        hits,
        total_score,
        final_action,
        final_flag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_outcome() {
        let outcome = aggregate(vec![]);
        assert_eq!(outcome, EvaluationOutcome::empty());
        assert_eq!(outcome.final_action, "APPROVE");
        assert_eq!(outcome.total_score, BigDecimal::from(0));
    }

    #[test]
    fn test_total_and_final_action() {
        let outcome = aggregate(vec![
            Hit::new("FLAG", "a").with_score(10),
            Hit::new("REJECT", "b").with_score(50),
            Hit::new("APPROVE", "c").with_score(5),
        ]);

        assert_eq!(outcome.total_score, BigDecimal::from(65));
        assert_eq!(outcome.final_action, "REJECT");
        assert_eq!(outcome.hits.len(), 3);
    }

    #[test]
    fn test_action_precedence() {
        let outcome = aggregate(vec![
            Hit::new("HOLD", "a"),
            Hit::new("REVIEW", "b"),
            Hit::new("FLAG", "c"),
        ]);
        assert_eq!(outcome.final_action, "REVIEW");
    }

    #[test]
    fn test_unknown_action_never_wins() {
        let outcome = aggregate(vec![Hit::new("ESCALATE", "a").with_score(99)]);
        assert_eq!(outcome.final_action, "APPROVE");
        assert_eq!(outcome.total_score, BigDecimal::from(99));
    }

    #[test]
    fn test_final_flag_from_highest_scoring_hit() {
        let outcome = aggregate(vec![
            Hit::new("FLAG", "a").with_score(10).with_flag("LOW_RISK"),
            Hit::new("FLAG", "b").with_score(40).with_flag("FRAUD"),
            // Higher score but no flag: does not contribute
            Hit::new("REJECT", "c").with_score(100),
        ]);
        assert_eq!(outcome.final_flag, Some("FRAUD".to_string()));
    }

    #[test]
    fn test_final_flag_tie_keeps_first() {
        let outcome = aggregate(vec![
            Hit::new("FLAG", "a").with_score(10).with_flag("FIRST"),
            Hit::new("FLAG", "b").with_score(10).with_flag("SECOND"),
        ]);
        assert_eq!(outcome.final_flag, Some("FIRST".to_string()));
    }

    #[test]
    fn test_no_flag_when_none_carry_one() {
        let outcome = aggregate(vec![Hit::new("FLAG", "a").with_score(10)]);
        assert_eq!(outcome.final_flag, None);
    }

    #[test]
    fn test_decimal_scores_sum_exactly() {
        use std::str::FromStr;
        let outcome = aggregate(vec![
            Hit::new("FLAG", "a").with_score(BigDecimal::from_str("0.1").unwrap()),
            Hit::new("FLAG", "b").with_score(BigDecimal::from_str("0.2").unwrap()),
        ]);
        assert_eq!(outcome.total_score, BigDecimal::from_str("0.3").unwrap());
    }
}
