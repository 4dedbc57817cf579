// src/core/orchestrator.rs — Drives the generate/run/evaluate/revise loop

use std::time::Duration;

use super::generator::SuiteGenerator;
use super::state_machine::{Action, Event, FeedbackLoop, LoopPolicy, LoopState};
use super::types::RunOutcome;
use crate::evaluator::test_runner::TestRunner;
use crate::evaluator::SuiteEvaluator;

/// Sequences the three components through the feedback state machine.
///
/// Every step awaits the previous one. The first error from any component
/// aborts the run; there is no per-call retry.
pub struct Orchestrator {
    generator: SuiteGenerator,
    runner: TestRunner,
    evaluator: SuiteEvaluator,
    policy: LoopPolicy,
    /// Pause after each revision request.
    delay: Duration,
}

impl Orchestrator {
    pub fn new(
        generator: SuiteGenerator,
        runner: TestRunner,
        evaluator: SuiteEvaluator,
        policy: LoopPolicy,
    ) -> Self {
        Self {
            generator,
            runner,
            evaluator,
            policy,
            delay: Duration::from_secs(5),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn generator(&self) -> &SuiteGenerator {
        &self.generator
    }

    pub fn evaluator(&self) -> &SuiteEvaluator {
        &self.evaluator
    }

    pub async fn run(&mut self) -> anyhow::Result<RunOutcome> {
        let mut fl = FeedbackLoop::new(self.policy);

        loop {
            match fl.next_action() {
                Action::GenerateInitial => {
                    self.generator.generate_initial().await?;
                    fl.apply(Event::SuiteWritten)?;
                }
                Action::RunSuite => {
                    let transcript = self.runner.run().await?;
                    tracing::debug!(exit_code = ?transcript.exit_code, "Runner finished");
                    fl.apply(Event::SuiteExecuted {
                        transcript: transcript.text,
                    })?;
                }
                Action::Analyse { transcript } => {
                    let evaluation = self.evaluator.analyse(&transcript).await?;
                    fl.apply(Event::SuiteScored(evaluation))?;
                }
                Action::Decide => {
                    let first = fl.revisions() == 0 && fl.scores().len() == 1;
                    let score = fl.scores().last().copied().unwrap_or_default();
                    fl.apply(Event::Decided)?;
                    log_decision(&fl, score, first);
                }
                Action::Revise { feedback } => {
                    tracing::info!("+++ START OF ITERATION: {} +++", fl.revisions() + 1);
                    self.generator.generate_revision(&feedback).await?;
                    fl.apply(Event::SuiteWritten)?;
                    if !self.delay.is_zero() {
                        tracing::debug!(
                            delay_ms = self.delay.as_millis() as u64,
                            "Pausing for rate limit"
                        );
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Action::Stop => break,
            }
        }

        let (termination, evaluation) = fl
            .termination()
            .ok_or_else(|| anyhow::anyhow!("feedback loop stopped outside a terminal state"))?;

        Ok(RunOutcome {
            termination,
            revisions: fl.revisions(),
            scores: fl.scores().to_vec(),
            final_evaluation: evaluation.clone(),
        })
    }
}

fn log_decision(fl: &FeedbackLoop, score: u32, first: bool) {
    match fl.state() {
        LoopState::Done { .. } if first => {
            tracing::info!(
                "Initial test suite analysed good enough already (score {})! No iteration started",
                score
            );
        }
        LoopState::Done { .. } => {
            tracing::info!("Test suite score of {} achieved! Stopping iteration.", score);
        }
        LoopState::Retry { .. } => {
            tracing::info!("Test suite score of {} achieved! Continuing iteration.", score);
        }
        LoopState::Exhausted { .. } => {
            tracing::warn!(
                revisions = fl.revisions(),
                "Test suite score of {} achieved, revision budget exhausted.",
                score
            );
        }
        _ => {}
    }
}
