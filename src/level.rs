use serde::{Deserialize, Serialize};

/// Severity attached to a reported access.
///
/// Levels come from `goboundcheck.toml`: a `[lints]` entry maps a rule name
/// to one of these, and names listed under `disabled` collapse to
/// [`Allow`](Self::Allow). Unconfigured rules report at `warning`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintLevel {
    /// Suppress the diagnostic entirely.
    Allow,
    /// Report without failing the run.
    #[default]
    Warn,
    /// Report and make the run exit non-zero.
    Error,
}

impl LintLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LintLevel::Allow => "allow",
            LintLevel::Warn => "warning",
            LintLevel::Error => "error",
        }
    }
}
