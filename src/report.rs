//! Advisory diagnostics.
//!
//! Every content finding is a located, single-line message in the classic
//! compiler format `"<filename>", line <N>: <message>`, which editor
//! jump-to-error tooling already understands. Findings never abort a file
//! and never affect the process exit status.

use std::fmt;

/// A single located diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// File the finding refers to.
    pub file: String,
    /// 1-based line number; `None` for file-level notes.
    pub line: Option<usize>,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "\"{}\", line {}: {}", self.file, line, self.message),
            None => write!(f, "\"{}\": {}", self.file, self.message),
        }
    }
}

/// Collects diagnostics during a lint pass.
///
/// Checks push into a `Reporter` rather than printing directly so tests can
/// assert on findings and the CLI can decide where the stream goes.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
    verbose: u8,
}

impl Reporter {
    /// Create an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reporter with a verbosity level.
    ///
    /// Level 0 suppresses informational rewrite notices; checks always
    /// report regardless of level.
    pub fn with_verbosity(verbose: u8) -> Self {
        Self {
            diagnostics: Vec::new(),
            verbose,
        }
    }

    /// Current verbosity level.
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// Report a finding at a 1-based line number.
    pub fn report(&mut self, file: &str, line: usize, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            file: file.to_string(),
            line: Some(line),
            message: message.into(),
        });
    }

    /// Report a file-level finding with no line number.
    pub fn report_file(&mut self, file: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            file: file.to_string(),
            line: None,
            message: message.into(),
        });
    }

    /// Report an informational notice, shown only when verbose.
    pub fn notice(&mut self, file: &str, line: usize, message: impl Into<String>) {
        if self.verbose > 0 {
            self.report(file, line, message);
        }
    }

    /// Number of diagnostics collected.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Iterate over collected diagnostics in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Drain collected diagnostics, leaving the reporter empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Print all collected diagnostics to stderr and clear them.
    pub fn flush(&mut self) {
        for d in self.take() {
            eprintln!("{}", d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_locator_format() {
        let d = Diagnostic {
            file: "campaign/scenario1.cfg".to_string(),
            line: Some(42),
            message: "[side] without type attribute".to_string(),
        };
        assert_eq!(
            d.to_string(),
            "\"campaign/scenario1.cfg\", line 42: [side] without type attribute"
        );
    }

    #[test]
    fn test_file_level_format() {
        let d = Diagnostic {
            file: "a.cfg".to_string(),
            line: None,
            message: "removed UTF-8 BOM character at the start of the file".to_string(),
        };
        assert_eq!(
            d.to_string(),
            "\"a.cfg\": removed UTF-8 BOM character at the start of the file"
        );
    }

    #[test]
    fn test_notice_respects_verbosity() {
        let mut quiet = Reporter::new();
        quiet.notice("a.cfg", 1, "inserting description");
        assert!(quiet.is_empty());

        let mut loud = Reporter::with_verbosity(1);
        loud.notice("a.cfg", 1, "inserting description");
        assert_eq!(loud.len(), 1);
    }

    #[test]
    fn test_take_empties() {
        let mut r = Reporter::new();
        r.report("a.cfg", 1, "one");
        r.report("a.cfg", 2, "two");
        let drained = r.take();
        assert_eq!(drained.len(), 2);
        assert!(r.is_empty());
    }
}
