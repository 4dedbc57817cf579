// src/core/types.rs — Core domain types

use serde::{Deserialize, Serialize};

/// Judge verdict for one suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// 0..=100, validated by the parser.
    pub score: u32,
    pub feedback: String,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// A suite scored above the threshold.
    Converged,
    /// The revision budget ran out first.
    Exhausted,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Converged => write!(f, "converged"),
            Termination::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Summary returned by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub termination: Termination,
    /// Revision rounds performed after the initial suite.
    pub revisions: u32,
    /// Score of every evaluation, in order.
    pub scores: Vec<u32>,
    pub final_evaluation: Evaluation,
}

impl RunOutcome {
    pub fn best_score(&self) -> u32 {
        self.scores.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_termination_display() {
        assert_eq!(Termination::Converged.to_string(), "converged");
        assert_eq!(Termination::Exhausted.to_string(), "exhausted");
    }

    #[test]
    fn test_best_score() {
        let outcome = RunOutcome {
            termination: Termination::Exhausted,
            revisions: 2,
            scores: vec![40, 75, 60],
            final_evaluation: Evaluation {
                score: 60,
                feedback: "regressed".into(),
            },
        };
        assert_eq!(outcome.best_score(), 75);
    }
}
