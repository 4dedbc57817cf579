// src/core/generator.rs — Session that writes and rewrites the test suite

use std::sync::Arc;

use tracing::Instrument;

use super::cleaner::clean_response;
use super::project::ProjectFiles;
use super::prompts;
use super::session::{ChatSession, SessionConfig};
use super::suite_store::{GenerationRound, SuiteStore};
use crate::provider::ModelProvider;
use crate::util::file_label;

pub const GENERATOR_NAME: &str = "TS Generator";

pub struct SuiteGenerator {
    session: ChatSession,
    project: Arc<ProjectFiles>,
    store: SuiteStore,
}

impl SuiteGenerator {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        model: &str,
        project: Arc<ProjectFiles>,
        framework: &str,
        store: SuiteStore,
    ) -> Self {
        let suite_name = file_label(store.working_file());
        let session = ChatSession::new(
            provider,
            SessionConfig {
                name: GENERATOR_NAME.into(),
                model: model.to_string(),
                system_prompt: prompts::generator_system_prompt(&project, framework, &suite_name),
                response_format: None,
            },
        );
        Self {
            session,
            project,
            store,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// First request of the session: the project files alone.
    pub async fn generate_initial(&mut self) -> anyhow::Result<GenerationRound> {
        let span = self.session.span().clone();
        async {
            tracing::info!("Sending initial test suite request...");
            let reply = self
                .session
                .send(prompts::initial_request(&self.project))
                .await?;
            tracing::info!("Received initial test suite!");
            self.store.save(&clean_response(&reply))
        }
        .instrument(span)
        .await
    }

    /// Follow-up in the same conversation so the model sees its last attempt.
    pub async fn generate_revision(&mut self, feedback: &str) -> anyhow::Result<GenerationRound> {
        let span = self.session.span().clone();
        async {
            tracing::info!("Sending feedback for generation of new test suite...");
            let reply = self
                .session
                .send(prompts::revision_request(&self.project, feedback))
                .await?;
            tracing::info!("Received updated test suite!");
            self.store.save(&clean_response(&reply))
        }
        .instrument(span)
        .await
    }
}
