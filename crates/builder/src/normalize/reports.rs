//! Small helpers for collecting what normalization passes did

use std::fmt::Write;

#[derive(Default, Debug)]
pub struct Report {
    pub changed_files: Vec<std::path::PathBuf>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Report {
    /// Create an empty report indicating success
    #[must_use]
    pub fn ok() -> Self {
        Self::default()
    }

    /// Check if the report contains fatal errors
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Add another report's data into `self`
    pub fn absorb(&mut self, other: Self) {
        self.changed_files.extend(other.changed_files);
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }

    /// Render the report as a formatted string for event emission
    #[must_use]
    pub fn render(&self, title: &str) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "{title}:");
        for e in &self.errors {
            let _ = writeln!(s, "  {e}");
        }
        for w in &self.warnings {
            let _ = writeln!(s, "  (warning) {w}");
        }
        s
    }
}

/// Convenience wrap that merges many [`Report`]s
#[derive(Default)]
pub struct MergedReport(Report);

impl MergedReport {
    pub fn absorb(&mut self, r: Report) {
        self.0.absorb(r);
    }

    /// Whether any absorbed report contained errors
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.0.is_fatal()
    }

    /// Render a summary of all absorbed reports
    #[must_use]
    pub fn render(&self, title: &str) -> String {
        self.0.render(title)
    }
}
