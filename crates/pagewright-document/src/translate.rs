// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page translators turn raw extracted page text into the fenced-Markdown
// dialect the renderer understands. The heavy lifting (usually a language
// model) lives outside this crate; `CommandTranslator` talks to it over
// stdin/stdout.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use pagewright_core::error::{PagewrightError, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Environment variable carrying the 1-based page number to the command.
pub const PAGE_ENV: &str = "PAGEWRIGHT_PAGE";

/// Converts one page of raw text into page Markdown.
///
/// Called concurrently for different pages, so implementations must not
/// depend on call order.
pub trait PageTranslator: Send + Sync + 'static {
    fn translate(
        &self,
        page_number: usize,
        raw_text: String,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Hands the extracted text straight to the renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl PageTranslator for Passthrough {
    async fn translate(&self, _page_number: usize, raw_text: String) -> Result<String> {
        Ok(raw_text)
    }
}

/// Runs an external program per page: raw text on stdin, Markdown on stdout.
///
/// A non-zero exit status, or running past the timeout, fails the page. The
/// child is killed if it is still running when the call is abandoned.
#[derive(Debug, Clone)]
pub struct CommandTranslator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandTranslator {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Split a shell-style command line such as `fixup --lang "en gb"`.
    pub fn from_command_line(command_line: &str, timeout: Duration) -> Result<Self> {
        let mut words = shlex::split(command_line)
            .filter(|words| !words.is_empty())
            .ok_or_else(|| {
                PagewrightError::InvalidConfig(format!(
                    "cannot parse translator command: {command_line:?}"
                ))
            })?;
        let program = words.remove(0);
        Ok(Self::new(program, words, timeout))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn failure(&self, page: usize, detail: impl std::fmt::Display) -> PagewrightError {
        PagewrightError::Translation {
            page,
            detail: format!("{}: {}", self.program, detail),
        }
    }
}

impl PageTranslator for CommandTranslator {
    #[instrument(skip(self, raw_text), fields(program = %self.program, bytes_len = raw_text.len()))]
    async fn translate(&self, page_number: usize, raw_text: String) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(PAGE_ENV, page_number.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| self.failure(page_number, format!("failed to start: {err}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.failure(page_number, "stdin was not captured"))?;

        // Feed stdin from a separate task so a chatty child can't deadlock
        // on a full stdout pipe.
        let feeder = tokio::spawn(async move {
            stdin.write_all(raw_text.as_bytes()).await?;
            stdin.shutdown().await
        });

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| self.failure(page_number, format!("timed out after {:?}", self.timeout)))?
            .map_err(|err| self.failure(page_number, err))?;

        match feeder.await {
            Ok(Ok(())) => {}
            // A child that exits without draining stdin is fine if it succeeded.
            Ok(Err(err)) => debug!(%err, "Translator closed stdin early"),
            Err(err) => warn!(%err, "stdin feeder task failed"),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure(
                page_number,
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let markdown = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(page_number, out_len = markdown.len(), "Page translated");
        Ok(markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passthrough_returns_input() {
        let out = Passthrough.translate(1, "raw page".into()).await.unwrap();
        assert_eq!(out, "raw page");
    }

    #[test]
    fn command_line_is_split_like_a_shell() {
        let t = CommandTranslator::from_command_line(r#"fixup --lang "en gb""#, Duration::from_secs(1))
            .unwrap();
        assert_eq!(t.program(), "fixup");
        assert_eq!(t.args, vec!["--lang", "en gb"]);
    }

    #[test]
    fn empty_or_unbalanced_command_lines_are_rejected() {
        for bad in ["", "   ", "fixup \"unterminated"] {
            assert!(matches!(
                CommandTranslator::from_command_line(bad, Duration::from_secs(1)),
                Err(PagewrightError::InvalidConfig(_))
            ));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn pipes_text_through_the_command() {
        let t = CommandTranslator::new("cat", vec![], Duration::from_secs(10));
        let out = t.translate(3, "```c\nint x;\n```".into()).await.unwrap();
        assert_eq!(out, "```c\nint x;\n```");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_sees_the_page_number() {
        let t = CommandTranslator::from_command_line(
            r#"sh -c 'cat >/dev/null; printf "page %s" "$PAGEWRIGHT_PAGE"'"#,
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(t.translate(7, "ignored".into()).await.unwrap(), "page 7");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_a_translation_error() {
        let t = CommandTranslator::from_command_line(
            "sh -c 'echo broken >&2; exit 3'",
            Duration::from_secs(10),
        )
        .unwrap();
        match t.translate(2, String::new()).await {
            Err(PagewrightError::Translation { page, detail }) => {
                assert_eq!(page, 2);
                assert!(detail.contains("broken"), "detail: {detail}");
            }
            other => panic!("expected translation error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_commands_time_out() {
        let t = CommandTranslator::new("sleep", vec!["5".into()], Duration::from_millis(100));
        let err = t.translate(1, String::new()).await.unwrap_err();
        assert!(err.to_string().contains("timed out"), "got {err}");
    }

    #[tokio::test]
    async fn missing_program_fails_to_start() {
        let t = CommandTranslator::new("pagewright-no-such-program", vec![], Duration::from_secs(1));
        let err = t.translate(1, String::new()).await.unwrap_err();
        assert!(err.to_string().contains("failed to start"), "got {err}");
    }
}
