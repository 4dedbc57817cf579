// src/evaluator/test_runner.rs — Runs the external test runner and captures a transcript
//
// The exit status never decides anything: stdout and stderr are folded into
// the transcript and judged by the evaluator. A unittest summary is parsed
// out for the log only.

use std::path::PathBuf;

use tokio::process::Command;

use crate::infra::errors::SuiteGenError;

/// Runs `program args...` inside the project directory.
pub struct TestRunner {
    program: String,
    args: Vec<String>,
    project_dir: PathBuf,
}

/// Output of one runner invocation.
#[derive(Debug, Clone)]
pub struct Transcript {
    /// Formatted text handed to the evaluator.
    pub text: String,
    pub exit_code: Option<i32>,
    pub summary: Option<UnittestSummary>,
}

/// Counts from the trailing `Ran N tests` / `OK` / `FAILED (...)` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnittestSummary {
    pub ran: u32,
    pub ok: bool,
    pub failures: u32,
    pub errors: u32,
    pub skipped: u32,
}

impl TestRunner {
    /// `command` is the program followed by its arguments.
    pub fn new(command: &[String], project_dir: impl Into<PathBuf>) -> Result<Self, SuiteGenError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| SuiteGenError::Config("test runner command is empty".into()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            project_dir: project_dir.into(),
        })
    }

    /// Run to completion (no timeout) and format the combined output.
    pub async fn run(&self) -> Result<Transcript, SuiteGenError> {
        tracing::info!("Starting execution of the generated test suite...");
        tracing::debug!(
            "Running: {} {} in {:?}",
            self.program,
            self.args.join(" "),
            self.project_dir
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.project_dir)
            .output()
            .await
            .map_err(|source| SuiteGenError::Runner {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        tracing::info!("Execution of the generated test suite done!");
        tracing::debug!("Test suite stdout:\n{}", stdout);
        tracing::debug!("Test suite stderr:\n{}", stderr);

        // unittest reports on stderr; check both so other runners work too.
        let summary = parse_unittest_summary(&stderr).or_else(|| parse_unittest_summary(&stdout));
        if let Some(ref s) = summary {
            tracing::info!(
                ran = s.ran,
                failures = s.failures,
                errors = s.errors,
                skipped = s.skipped,
                "Suite {}",
                if s.ok { "passed" } else { "failed" }
            );
        }

        Ok(Transcript {
            text: format_transcript(&stdout, &stderr),
            exit_code: output.status.code(),
            summary,
        })
    }
}

/// Wrap stdout followed by stderr in the fixed transcript template.
pub fn format_transcript(stdout: &str, stderr: &str) -> String {
    format!(
        "The execution of the test suite yielded the following result:\n```\n{}{}```\n",
        stdout, stderr
    )
}

/// Parse the summary unittest prints at the end of a run.
///
/// ```text
/// Ran 6 tests in 0.002s
///
/// FAILED (failures=1, errors=1, skipped=2)
/// ```
pub fn parse_unittest_summary(output: &str) -> Option<UnittestSummary> {
    let mut summary: Option<UnittestSummary> = None;

    for line in output.lines() {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("Ran ") {
            if let Some(Ok(ran)) = rest.split_whitespace().next().map(str::parse) {
                summary = Some(UnittestSummary {
                    ran,
                    ..Default::default()
                });
                continue;
            }
        }

        let Some(ref mut s) = summary else { continue };

        if trimmed == "OK" || trimmed.starts_with("OK (") {
            s.ok = true;
            read_counts(trimmed, s);
        } else if trimmed.starts_with("FAILED") {
            s.ok = false;
            read_counts(trimmed, s);
        } else if trimmed == "NO TESTS RAN" {
            s.ok = false;
        }
    }

    summary
}

/// Read `key=value` pairs from `(failures=1, errors=2, skipped=3)`.
fn read_counts(line: &str, summary: &mut UnittestSummary) {
    let Some(start) = line.find('(') else { return };
    let inner = line[start + 1..].trim_end_matches(')');

    for pair in inner.split(',') {
        let Some((key, value)) = pair.trim().split_once('=') else {
            continue;
        };
        let Ok(n) = value.trim().parse::<u32>() else {
            continue;
        };
        match key.trim() {
            "failures" => summary.failures = n,
            "errors" => summary.errors = n,
            "skipped" => summary.skipped = n,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_transcript_order() {
        assert_eq!(
            format_transcript("out\n", "err\n"),
            "The execution of the test suite yielded the following result:\n```\nout\nerr\n```\n"
        );
    }

    #[test]
    fn test_parse_ok() {
        let output = "\
......
----------------------------------------------------------------------
Ran 6 tests in 0.002s

OK
";
        let s = parse_unittest_summary(output).unwrap();
        assert_eq!(
            s,
            UnittestSummary {
                ran: 6,
                ok: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_parse_ok_with_skips() {
        let s = parse_unittest_summary("Ran 1 test in 0.000s\n\nOK (skipped=2)\n").unwrap();
        assert!(s.ok);
        assert_eq!(s.ran, 1);
        assert_eq!(s.skipped, 2);
    }

    #[test]
    fn test_parse_failed() {
        let output = "\
..F.E
======================================================================
FAIL: test_empty (tests.LexerTest.test_empty)
----------------------------------------------------------------------
Ran 5 tests in 0.010s

FAILED (failures=1, errors=1)
";
        let s = parse_unittest_summary(output).unwrap();
        assert!(!s.ok);
        assert_eq!(s.ran, 5);
        assert_eq!(s.failures, 1);
        assert_eq!(s.errors, 1);
    }

    #[test]
    fn test_parse_no_tests() {
        let s = parse_unittest_summary("Ran 0 tests in 0.000s\n\nNO TESTS RAN\n").unwrap();
        assert_eq!(s.ran, 0);
        assert!(!s.ok);
    }

    #[test]
    fn test_parse_import_error_has_no_summary() {
        let output = "Traceback (most recent call last):\nModuleNotFoundError: No module named 'src'\n";
        assert!(parse_unittest_summary(output).is_none());
    }

    #[test]
    fn test_new_rejects_empty_command() {
        assert!(TestRunner::new(&[], ".").is_err());
    }

    #[tokio::test]
    async fn test_run_captures_both_streams() {
        let dir = tempfile::TempDir::new().unwrap();
        let command: Vec<String> = ["sh", "-c", "echo out; echo err >&2; exit 3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let runner = TestRunner::new(&command, dir.path()).unwrap();

        let t = runner.run().await.unwrap();
        assert_eq!(t.text, format_transcript("out\n", "err\n"));
        assert_eq!(t.exit_code, Some(3));
        assert!(t.summary.is_none());
    }

    #[tokio::test]
    async fn test_run_missing_program_is_error() {
        let command = vec!["definitely-not-a-real-runner-xyz".to_string()];
        let runner = TestRunner::new(&command, ".").unwrap();
        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, SuiteGenError::Runner { .. }));
    }
}
