// src/core/suite_store.rs — Working suite file plus dated history copies

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local, TimeZone};

const MAX_SAME_SECOND: u32 = 10_000;

/// What one generator call left on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRound {
    pub source: String,
    pub save_path: PathBuf,
    pub log_path: PathBuf,
}

/// Writes each suite to the working file (overwrite) and to
/// `<history_dir>/<YYYY-MM-DD>/tests_<HH_MM_SS>.<ext>` (append-only).
#[derive(Debug, Clone)]
pub struct SuiteStore {
    working_file: PathBuf,
    history_dir: PathBuf,
    extension: String,
}

impl SuiteStore {
    pub fn new(
        working_file: impl Into<PathBuf>,
        history_dir: impl Into<PathBuf>,
        extension: &str,
    ) -> Self {
        Self {
            working_file: working_file.into(),
            history_dir: history_dir.into(),
            extension: extension.to_string(),
        }
    }

    pub fn working_file(&self) -> &Path {
        &self.working_file
    }

    pub fn save(&self, source: &str) -> anyhow::Result<GenerationRound> {
        self.save_at(source, Local::now())
    }

    pub fn save_at<Tz: TimeZone>(
        &self,
        source: &str,
        when: DateTime<Tz>,
    ) -> anyhow::Result<GenerationRound>
    where
        Tz::Offset: std::fmt::Display,
    {
        fs::write(&self.working_file, source)
            .with_context(|| format!("writing {}", self.working_file.display()))?;

        let day_dir = self.history_dir.join(when.format("%Y-%m-%d").to_string());
        fs::create_dir_all(&day_dir)
            .with_context(|| format!("creating {}", day_dir.display()))?;

        let (log_path, mut file) =
            self.create_log_file(&day_dir, &when.format("%H_%M_%S").to_string())?;
        tracing::debug!("Saving suite to {}", log_path.display());
        file.write_all(source.as_bytes())
            .with_context(|| format!("writing {}", log_path.display()))?;

        Ok(GenerationRound {
            source: source.to_string(),
            save_path: self.working_file.clone(),
            log_path,
        })
    }

    /// Create `tests_<time>.<ext>`, or `tests_<time>_<n>.<ext>` if that second
    /// is taken. Existing history files are never opened.
    fn create_log_file(&self, day_dir: &Path, time: &str) -> anyhow::Result<(PathBuf, File)> {
        for n in 0..MAX_SAME_SECOND {
            let name = if n == 0 {
                format!("tests_{}.{}", time, self.extension)
            } else {
                format!("tests_{}_{}.{}", time, n, self.extension)
            };
            let path = day_dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("creating {}", path.display()))
                }
            }
        }
        anyhow::bail!(
            "more than {} suites saved at {} in {}",
            MAX_SAME_SECOND,
            time,
            day_dir.display()
        )
    }
}
