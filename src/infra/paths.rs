// src/infra/paths.rs — Filesystem layout of a run
//
// Everything is relative to the process working directory unless the
// config names absolute paths:
//   <project.dir>/<sources...>              read-only inputs
//   <project.dir>/<suite_file>              working suite, overwritten each round
//   <logging.dir>/suites/<date>/tests_<t>   append-only suite history
//   <logging.dir>/<logging.file>            rotating log file

use std::path::{Path, PathBuf};

use crate::infra::config::Config;

#[derive(Debug, Clone)]
pub struct Layout {
    pub project_dir: PathBuf,
    pub sources: Vec<PathBuf>,
    pub suite_file: PathBuf,
    pub logs_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Layout {
    pub fn from_config(config: &Config) -> Self {
        Self::rooted(Path::new("."), config)
    }

    /// Resolve the layout below `root` instead of the working directory.
    pub fn rooted(root: &Path, config: &Config) -> Self {
        let project_dir = root.join(&config.project.dir);
        let logs_dir = root.join(&config.logging.dir);
        Self {
            sources: config
                .project
                .sources
                .iter()
                .map(|s| project_dir.join(s))
                .collect(),
            suite_file: project_dir.join(&config.project.suite_file),
            log_file: logs_dir.join(&config.logging.file),
            project_dir,
            logs_dir,
        }
    }

    /// Root of the dated suite history.
    pub fn suites_log_dir(&self) -> PathBuf {
        self.logs_dir.join("suites")
    }

    /// File extension used for archived suites, taken from the working file.
    pub fn suite_extension(&self) -> &str {
        self.suite_file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = Layout::rooted(Path::new("/work"), &Config::default());
        assert_eq!(layout.project_dir, PathBuf::from("/work/project"));
        assert_eq!(layout.suite_file, PathBuf::from("/work/project/tests.py"));
        assert_eq!(
            layout.sources,
            vec![
                PathBuf::from("/work/project/src/lexer.py"),
                PathBuf::from("/work/project/src/tokens.py"),
            ]
        );
        assert_eq!(layout.log_file, PathBuf::from("/work/logs/TestSuite.log"));
        assert_eq!(layout.suites_log_dir(), PathBuf::from("/work/logs/suites"));
        assert_eq!(layout.suite_extension(), "py");
    }

    #[test]
    fn test_extension_fallback() {
        let mut config = Config::default();
        config.project.suite_file = "TESTS".into();
        let layout = Layout::rooted(Path::new("."), &config);
        assert_eq!(layout.suite_extension(), "txt");
    }
}
