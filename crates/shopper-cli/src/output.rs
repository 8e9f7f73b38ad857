//! Human-readable run summaries

use console::{style, Style, Term};
use std::fmt::Write as _;
use std::time::Duration;
use weather_shopper::{RunReport, SessionSnapshot};

/// Writes run results to stderr, leaving stdout for JSON
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            use_color,
            quiet,
        }
    }

    /// Print one run's result
    pub fn run(&self, index: usize, report: &RunReport) {
        if report.is_success() {
            if !self.quiet {
                let line = format!(
                    "run {} ({}) {}",
                    index + 1,
                    report.run_id,
                    describe_session(&report.session)
                );
                self.success(&line);
            }
            return;
        }

        let mut line = format!("run {} ({})", index + 1, report.run_id);
        if let Some(failure) = &report.failure {
            let _ = write!(
                line,
                " failed in {} [{}]: {}",
                failure.stage, failure.kind, failure.message
            );
            for path in [&failure.artifacts.screenshot, &failure.artifacts.html]
                .into_iter()
                .flatten()
            {
                let _ = write!(line, "\n    artifact: {}", path.display());
            }
        }
        self.failure(&line);
    }

    /// Print a run whose browser never started
    pub fn launch_failed(&self, index: usize, message: &str) {
        self.failure(&format!("run {} could not start: {message}", index + 1));
    }

    /// Print an informational line
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    fn success(&self, message: &str) {
        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print the closing summary
    pub fn summary(&self, passed: usize, failed: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }
        let _ = self.term.write_line("");
        let total = passed + failed;
        let secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };
            let _ = self.term.write_line(&format!(
                "{status} {total} run(s) in {secs:.2}s ({} passed, {} failed)",
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} run(s) in {secs:.2}s ({passed} passed, {failed} failed)"
            ));
        }
    }
}

/// One-line description of what a run bought
#[must_use]
pub fn describe_session(session: &SessionSnapshot) -> String {
    let mut out = String::new();
    if let Some(t) = session.temperature {
        let _ = write!(out, "{t}°C");
    }
    if let Some(category) = session.product_category {
        let _ = write!(out, " -> {category}");
    }
    if let Some(items) = &session.added_items {
        let _ = write!(out, ": {}", items.join(", "));
    }
    if let Some(total) = session.verified_total {
        let _ = write!(out, " (Rs. {total})");
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use weather_shopper::ProductCategory;

    #[test]
    fn test_describe_full_session() {
        let session = SessionSnapshot {
            temperature: Some(10),
            product_category: Some(ProductCategory::Moisturizer),
            added_items: Some(vec!["Aloe Vera Gel".into(), "Almond Cream".into()]),
            verified_total: Some(300),
        };
        let text = describe_session(&session);
        assert!(text.starts_with("10°C -> "));
        assert!(text.contains("Aloe Vera Gel, Almond Cream"));
        assert!(text.ends_with("(Rs. 300)"));
    }

    #[test]
    fn test_describe_empty_session() {
        assert_eq!(describe_session(&SessionSnapshot::default()), "");
    }

    #[test]
    fn test_reporter_default() {
        let reporter = Reporter::default();
        assert!(reporter.use_color);
        assert!(!reporter.quiet);
    }
}
