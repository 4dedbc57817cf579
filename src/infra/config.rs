// src/infra/config.rs — Configuration loading (TOML)

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::infra::errors::SuiteGenError;

/// Default config file looked up in the working directory.
pub const CONFIG_FILE: &str = "suitegen.toml";

/// Environment variable holding the Gemini API credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the model name.
pub const MODEL_ENV: &str = "SUITEGEN_MODEL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub iteration: IterationConfig,

    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub base_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gemini-2.0-flash".into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IterationConfig {
    /// Revision rounds allowed after the initial suite.
    pub max_iterations: u32,
    /// Scores strictly above this value end the loop.
    pub score_threshold: u32,
    /// Pause after each revision (the API allows 15 requests per minute).
    pub delay_secs: u64,
}

impl Default for IterationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            score_threshold: 90,
            delay_secs: 5,
        }
    }
}

impl IterationConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub dir: String,
    /// Source files relative to `dir`, sent to both sessions verbatim.
    pub sources: Vec<String>,
    pub suite_file: String,
    pub language: String,
    pub framework: String,
    /// Program and arguments of the test runner, executed inside `dir`.
    pub runner: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            dir: "project".into(),
            sources: vec!["src/lexer.py".into(), "src/tokens.py".into()],
            suite_file: "tests.py".into(),
            language: "python".into(),
            framework: "unittest".into(),
            runner: vec!["python".into(), "-m".into(), "unittest".into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: String,
    pub file: String,
    pub level: String,
    pub max_bytes: u64,
    pub backups: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: "logs".into(),
            file: "TestSuite.log".into(),
            level: "info".into(),
            max_bytes: 100 * 1024,
            backups: 5,
        }
    }
}

impl Config {
    /// Load `suitegen.toml` from the working directory, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| SuiteGenError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SUITEGEN_MODEL` if it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(model) = std::env::var(MODEL_ENV) {
            if !model.trim().is_empty() {
                self.model.name = model.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<(), SuiteGenError> {
        if self.project.runner.is_empty() {
            return Err(SuiteGenError::Config(
                "project.runner must name a program".into(),
            ));
        }
        if self.project.sources.is_empty() {
            return Err(SuiteGenError::Config(
                "project.sources must list at least one file".into(),
            ));
        }
        if self.iteration.score_threshold > 100 {
            return Err(SuiteGenError::Config(format!(
                "iteration.score_threshold must be within 0..=100, got {}",
                self.iteration.score_threshold
            )));
        }
        Ok(())
    }
}

/// Load `.env` from the working directory or the nearest parent. Variables
/// already present in the environment are left alone.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Same as [`load_dotenv`] for an explicit file; a missing file is an error.
pub fn load_dotenv_from(path: &Path) -> anyhow::Result<()> {
    dotenvy::from_path(path).with_context(|| format!("loading {}", path.display()))
}

/// Read the API credential from the environment.
pub fn api_key_from_env() -> Result<String, SuiteGenError> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(SuiteGenError::MissingApiKey),
    }
}
