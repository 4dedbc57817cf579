// src/evaluator/mod.rs — Judge session that scores a generated suite

pub mod parser;
pub mod test_runner;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::Instrument;

use crate::core::project::ProjectFiles;
use crate::core::prompts;
use crate::core::session::{ChatSession, SessionConfig};
use crate::core::types::Evaluation;
use crate::provider::{ModelProvider, ResponseFormat};
use crate::util::{file_label, preview};

pub const EVALUATOR_NAME: &str = "TS Evaluator";

/// Scores the working suite against the project files and a run transcript.
pub struct SuiteEvaluator {
    session: ChatSession,
    project: Arc<ProjectFiles>,
    suite_file: PathBuf,
}

impl SuiteEvaluator {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        model: &str,
        project: Arc<ProjectFiles>,
        suite_file: impl Into<PathBuf>,
    ) -> Self {
        let suite_file = suite_file.into();
        let suite_name = file_label(&suite_file);
        let session = ChatSession::new(
            provider,
            SessionConfig {
                name: EVALUATOR_NAME.into(),
                model: model.to_string(),
                system_prompt: prompts::evaluator_system_prompt(&project, &suite_name),
                response_format: Some(ResponseFormat::json(parser::evaluation_schema())),
            },
        );
        Self {
            session,
            project,
            suite_file,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Re-read the working suite and ask the judge for a score and feedback.
    /// A reply that does not parse is a hard error.
    pub async fn analyse(&mut self, transcript: &str) -> anyhow::Result<Evaluation> {
        let span = self.session.span().clone();
        async {
            let suite = std::fs::read_to_string(&self.suite_file)
                .with_context(|| format!("reading {}", self.suite_file.display()))?;
            let suite_name = file_label(&self.suite_file);

            tracing::info!("Sending test suite analyse request...");
            let reply = self
                .session
                .send(prompts::analysis_request(
                    &self.project,
                    transcript,
                    &suite_name,
                    &suite,
                ))
                .await?;

            let evaluation = parser::parse_evaluation(&reply)?;
            tracing::info!("Received response to test suite analyse request!");
            tracing::debug!("Analyse Score: {}", evaluation.score);
            tracing::debug!("Analyse Feedback: {}", preview(&evaluation.feedback, 2000));
            Ok::<_, anyhow::Error>(evaluation)
        }
        .instrument(span)
        .await
    }
}
