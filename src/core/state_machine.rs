// src/core/state_machine.rs — Pure state machine for the generate/run/evaluate loop
//
//   Init ─▶ Generated ─▶ Executed ─▶ Evaluated ─┬─▶ Done
//              ▲                                ├─▶ Exhausted
//              └──────────── Retry ◀────────────┘
//
// No I/O here. The orchestrator asks `next_action` what to do, does it, and
// reports back with an `Event`. Invalid pairs become errors, never panics.

use super::types::{Evaluation, Termination};
use crate::infra::config::IterationConfig;
use crate::infra::errors::SuiteGenError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    Init,
    Generated,
    Executed { transcript: String },
    Evaluated { evaluation: Evaluation },
    Retry { feedback: String },
    Done { evaluation: Evaluation },
    Exhausted { evaluation: Evaluation },
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Done { .. } | LoopState::Exhausted { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            LoopState::Init => "init",
            LoopState::Generated => "generated",
            LoopState::Executed { .. } => "executed",
            LoopState::Evaluated { .. } => "evaluated",
            LoopState::Retry { .. } => "retry",
            LoopState::Done { .. } => "done",
            LoopState::Exhausted { .. } => "exhausted",
        }
    }
}

/// What the orchestrator must do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    GenerateInitial,
    RunSuite,
    Analyse { transcript: String },
    Decide,
    Revise { feedback: String },
    Stop,
}

/// Outcome of the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SuiteWritten,
    SuiteExecuted { transcript: String },
    SuiteScored(Evaluation),
    Decided,
}

impl Event {
    fn label(&self) -> &'static str {
        match self {
            Event::SuiteWritten => "suite written",
            Event::SuiteExecuted { .. } => "suite executed",
            Event::SuiteScored(_) => "suite scored",
            Event::Decided => "decided",
        }
    }
}

/// Limits that decide between Done, Retry and Exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopPolicy {
    /// Scores strictly above this converge.
    pub score_threshold: u32,
    /// Revision rounds allowed after the initial suite.
    pub max_revisions: u32,
}

impl Default for LoopPolicy {
    fn default() -> Self {
        Self {
            score_threshold: 90,
            max_revisions: 10,
        }
    }
}

impl From<&IterationConfig> for LoopPolicy {
    fn from(config: &IterationConfig) -> Self {
        Self {
            score_threshold: config.score_threshold,
            max_revisions: config.max_iterations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Revise,
    GiveUp,
}

/// Threshold is strict: a score equal to it asks for another round.
pub fn decide(score: u32, revisions: u32, policy: &LoopPolicy) -> Verdict {
    if score > policy.score_threshold {
        Verdict::Accept
    } else if revisions < policy.max_revisions {
        Verdict::Revise
    } else {
        Verdict::GiveUp
    }
}

pub fn next_action(state: &LoopState) -> Action {
    match state {
        LoopState::Init => Action::GenerateInitial,
        LoopState::Generated => Action::RunSuite,
        LoopState::Executed { transcript } => Action::Analyse {
            transcript: transcript.clone(),
        },
        LoopState::Evaluated { .. } => Action::Decide,
        LoopState::Retry { feedback } => Action::Revise {
            feedback: feedback.clone(),
        },
        LoopState::Done { .. } | LoopState::Exhausted { .. } => Action::Stop,
    }
}

/// Apply `event` to `state`. Returns the new state and revision count.
pub fn transition(
    state: LoopState,
    revisions: u32,
    event: Event,
    policy: &LoopPolicy,
) -> Result<(LoopState, u32), SuiteGenError> {
    match (state, event) {
        (LoopState::Init, Event::SuiteWritten) => Ok((LoopState::Generated, revisions)),

        (LoopState::Generated, Event::SuiteExecuted { transcript }) => {
            Ok((LoopState::Executed { transcript }, revisions))
        }

        (LoopState::Executed { .. }, Event::SuiteScored(evaluation)) => {
            Ok((LoopState::Evaluated { evaluation }, revisions))
        }

        (LoopState::Evaluated { evaluation }, Event::Decided) => {
            let next = match decide(evaluation.score, revisions, policy) {
                Verdict::Accept => LoopState::Done { evaluation },
                Verdict::Revise => LoopState::Retry {
                    feedback: evaluation.feedback,
                },
                Verdict::GiveUp => LoopState::Exhausted { evaluation },
            };
            Ok((next, revisions))
        }

        (LoopState::Retry { .. }, Event::SuiteWritten) => {
            Ok((LoopState::Generated, revisions + 1))
        }

        (state, event) => Err(SuiteGenError::Transition {
            state: state.label().into(),
            event: event.label().into(),
        }),
    }
}

/// Owns the current state and the revision counter for one run.
#[derive(Debug, Clone)]
pub struct FeedbackLoop {
    state: LoopState,
    revisions: u32,
    policy: LoopPolicy,
    scores: Vec<u32>,
}

impl FeedbackLoop {
    pub fn new(policy: LoopPolicy) -> Self {
        Self {
            state: LoopState::Init,
            revisions: 0,
            policy,
            scores: Vec::new(),
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn revisions(&self) -> u32 {
        self.revisions
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn next_action(&self) -> Action {
        next_action(&self.state)
    }

    pub fn apply(&mut self, event: Event) -> Result<&LoopState, SuiteGenError> {
        if let Event::SuiteScored(ref evaluation) = event {
            if matches!(self.state, LoopState::Executed { .. }) {
                self.scores.push(evaluation.score);
            }
        }
        let state = std::mem::replace(&mut self.state, LoopState::Init);
        match transition(state.clone(), self.revisions, event, &self.policy) {
            Ok((next, revisions)) => {
                self.state = next;
                self.revisions = revisions;
                Ok(&self.state)
            }
            Err(e) => {
                self.state = state;
                Err(e)
            }
        }
    }

    /// How the run ended, once a terminal state is reached.
    pub fn termination(&self) -> Option<(Termination, &Evaluation)> {
        match &self.state {
            LoopState::Done { evaluation } => Some((Termination::Converged, evaluation)),
            LoopState::Exhausted { evaluation } => Some((Termination::Exhausted, evaluation)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(score: u32) -> Evaluation {
        Evaluation {
            score,
            feedback: format!("feedback for {}", score),
        }
    }

    /// Drive one generate/run/score/decide cycle and return the state after deciding.
    fn cycle(fl: &mut FeedbackLoop, score: u32) -> LoopState {
        match fl.next_action() {
            Action::GenerateInitial | Action::Revise { .. } => {
                fl.apply(Event::SuiteWritten).unwrap();
            }
            other => panic!("unexpected action {:?}", other),
        }
        assert_eq!(fl.next_action(), Action::RunSuite);
        fl.apply(Event::SuiteExecuted {
            transcript: "ran".into(),
        })
        .unwrap();
        assert_eq!(
            fl.next_action(),
            Action::Analyse {
                transcript: "ran".into()
            }
        );
        fl.apply(Event::SuiteScored(eval(score))).unwrap();
        assert_eq!(fl.next_action(), Action::Decide);
        fl.apply(Event::Decided).unwrap().clone()
    }

    #[test]
    fn test_decide_threshold_is_strict() {
        let p = LoopPolicy::default();
        assert_eq!(decide(90, 0, &p), Verdict::Revise);
        assert_eq!(decide(91, 0, &p), Verdict::Accept);
        assert_eq!(decide(100, 10, &p), Verdict::Accept);
        assert_eq!(decide(90, 10, &p), Verdict::GiveUp);
        assert_eq!(decide(0, 9, &p), Verdict::Revise);
    }

    #[test]
    fn test_initial_95_stops_without_revision() {
        let mut fl = FeedbackLoop::new(LoopPolicy::default());
        let state = cycle(&mut fl, 95);
        assert_eq!(state, LoopState::Done { evaluation: eval(95) });
        assert_eq!(fl.revisions(), 0);
        assert_eq!(fl.next_action(), Action::Stop);
    }

    #[test]
    fn test_score_90_continues_91_stops() {
        let mut fl = FeedbackLoop::new(LoopPolicy::default());
        assert_eq!(
            cycle(&mut fl, 90),
            LoopState::Retry {
                feedback: "feedback for 90".into()
            }
        );
        assert_eq!(cycle(&mut fl, 91), LoopState::Done { evaluation: eval(91) });
        assert_eq!(fl.revisions(), 1);
        assert_eq!(fl.scores(), &[90, 91]);
    }

    #[test]
    fn test_85_asks_for_exactly_one_revision_before_reevaluating() {
        let mut fl = FeedbackLoop::new(LoopPolicy::default());
        cycle(&mut fl, 85);
        assert_eq!(
            fl.next_action(),
            Action::Revise {
                feedback: "feedback for 85".into()
            }
        );
        fl.apply(Event::SuiteWritten).unwrap();
        assert_eq!(fl.revisions(), 1);
        assert_eq!(fl.next_action(), Action::RunSuite);
    }

    #[test]
    fn test_cap_is_ten_revisions() {
        let mut fl = FeedbackLoop::new(LoopPolicy::default());
        let mut state = cycle(&mut fl, 10);
        let mut evaluations = 1;
        while !state.is_terminal() {
            state = cycle(&mut fl, 10);
            evaluations += 1;
        }
        assert_eq!(fl.revisions(), 10);
        assert_eq!(evaluations, 11);
        assert_eq!(state, LoopState::Exhausted { evaluation: eval(10) });
        assert_eq!(fl.next_action(), Action::Stop);
        let (termination, last) = fl.termination().unwrap();
        assert_eq!(termination, Termination::Exhausted);
        assert_eq!(last.score, 10);
    }

    #[test]
    fn test_zero_budget_gives_up_after_initial() {
        let mut fl = FeedbackLoop::new(LoopPolicy {
            score_threshold: 90,
            max_revisions: 0,
        });
        assert!(matches!(cycle(&mut fl, 50), LoopState::Exhausted { .. }));
    }

    #[test]
    fn test_invalid_transition_is_error_and_keeps_state() {
        let mut fl = FeedbackLoop::new(LoopPolicy::default());
        let err = fl.apply(Event::Decided).unwrap_err();
        assert!(matches!(err, SuiteGenError::Transition { .. }));
        assert_eq!(fl.state(), &LoopState::Init);
        assert!(err.to_string().contains("decided while init"));
    }

    #[test]
    fn test_terminal_states_reject_events() {
        let done = LoopState::Done { evaluation: eval(99) };
        assert!(transition(done, 0, Event::SuiteWritten, &LoopPolicy::default()).is_err());
    }

    #[test]
    fn test_policy_from_config() {
        let p = LoopPolicy::from(&IterationConfig::default());
        assert_eq!(p, LoopPolicy::default());
    }
}
