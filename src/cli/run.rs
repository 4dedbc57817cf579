// src/cli/run.rs — Default command: build the components and run the loop

use std::path::Path;
use std::sync::Arc;

use super::Cli;
use crate::core::generator::SuiteGenerator;
use crate::core::orchestrator::Orchestrator;
use crate::core::project::ProjectFiles;
use crate::core::state_machine::LoopPolicy;
use crate::core::suite_store::SuiteStore;
use crate::core::types::{RunOutcome, Termination};
use crate::evaluator::test_runner::TestRunner;
use crate::evaluator::SuiteEvaluator;
use crate::infra::config::Config;
use crate::infra::paths::Layout;
use crate::provider::ModelProvider;

/// Load the config and layer environment and flags on top.
/// Precedence: flag > environment > file > defaults.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => Config::load_from(Path::new(path))?,
        None => Config::load()?,
    };
    config.apply_env();

    if let Some(ref model) = cli.model {
        config.model.name = model.clone();
    }
    if let Some(n) = cli.max_iterations {
        config.iteration.max_iterations = n;
    }
    if let Some(secs) = cli.delay_secs {
        config.iteration.delay_secs = secs;
    }

    config.validate()?;
    Ok(config)
}

/// Wire provider, sessions, runner and state machine together.
pub fn build_orchestrator(
    provider: Arc<dyn ModelProvider>,
    config: &Config,
    layout: &Layout,
) -> anyhow::Result<Orchestrator> {
    tracing::info!("Reading in project files...");
    let project = Arc::new(ProjectFiles::load(
        &layout.project_dir,
        &layout.sources,
        &config.project.language,
    )?);

    let store = SuiteStore::new(
        &layout.suite_file,
        layout.suites_log_dir(),
        layout.suite_extension(),
    );

    let generator = SuiteGenerator::new(
        provider.clone(),
        &config.model.name,
        project.clone(),
        &config.project.framework,
        store,
    );
    let evaluator = SuiteEvaluator::new(provider, &config.model.name, project, &layout.suite_file);
    let runner = TestRunner::new(&config.project.runner, &layout.project_dir)?;

    Ok(
        Orchestrator::new(generator, runner, evaluator, LoopPolicy::from(&config.iteration))
            .with_delay(config.iteration.delay()),
    )
}

/// Run the whole loop and report how it ended.
pub async fn run_loop(
    provider: Arc<dyn ModelProvider>,
    config: &Config,
    layout: &Layout,
) -> anyhow::Result<RunOutcome> {
    tracing::info!(
        model = %config.model.name,
        provider = provider.id(),
        max_iterations = config.iteration.max_iterations,
        threshold = config.iteration.score_threshold,
        "Starting test suite generation"
    );

    let mut orchestrator = build_orchestrator(provider, config, layout)?;
    let outcome = orchestrator.run().await?;

    let generator_tokens = orchestrator.generator().session().usage().total();
    let evaluator_tokens = orchestrator.evaluator().session().usage().total();

    match outcome.termination {
        Termination::Converged => tracing::info!(
            revisions = outcome.revisions,
            score = outcome.final_evaluation.score,
            tokens = generator_tokens + evaluator_tokens,
            "Test suite accepted: {}",
            layout.suite_file.display()
        ),
        Termination::Exhausted => tracing::warn!(
            revisions = outcome.revisions,
            best_score = outcome.best_score(),
            last_score = outcome.final_evaluation.score,
            tokens = generator_tokens + evaluator_tokens,
            "No test suite scored above {}; keeping the last one at {}",
            config.iteration.score_threshold,
            layout.suite_file.display()
        ),
    }

    Ok(outcome)
}
