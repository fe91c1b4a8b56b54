//! Core goboundcheck engine and lint registry.
//!
//! The crate flags Go slice and array accesses that are not demonstrably
//! guarded by a bounds check: an enclosing `if` that inspects `len`/`cap` of
//! the container, a `for ... range` loop indexing with its own key variable,
//! or a `sort.Interface` `Less`/`Swap` method indexing with its parameters.
//! Parsing is tree-sitter based; type and method-set questions go through
//! injectable oracles (see [`oracle`]) so the analysis stays testable
//! without a full Go type-checker.
//!
//! The pass is single-threaded and purely functional over one immutable
//! parse tree per invocation; callers may run independent invocations
//! concurrently.

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod level;
pub mod lint;
pub mod oracle;
pub mod parser;
pub mod rules;
pub mod telemetry;
pub mod visitor;

use anyhow::Result;
use tree_sitter::Tree;

use crate::diagnostics::Diagnostic;
use crate::lint::{LintContext, LintRegistry, LintSettings};
use crate::parser::parse_source;

/// Engine orchestrates linting by parsing source and running registered rules.
pub struct LintEngine {
    registry: LintRegistry,
    settings: LintSettings,
}

impl LintEngine {
    /// Create a new engine with default lint settings.
    pub fn new(registry: LintRegistry) -> Self {
        Self {
            registry,
            settings: LintSettings::default(),
        }
    }

    /// Create a new engine with explicit lint settings (e.g. from config).
    pub fn new_with_settings(registry: LintRegistry, settings: LintSettings) -> Self {
        Self { registry, settings }
    }

    /// Lint a single in-memory compilation unit and return its diagnostics
    /// in document order.
    pub fn lint_source(&self, source: &str) -> Result<Vec<Diagnostic>> {
        let tree = parse_source(source)?;
        self.run_rules(source, &tree)
    }

    fn run_rules(&self, source: &str, tree: &Tree) -> Result<Vec<Diagnostic>> {
        let mut ctx = LintContext::new(self.settings.clone());
        let root = tree.root_node();

        for rule in self.registry.rules() {
            rule.check(root, source, &mut ctx);
        }

        let diagnostics = ctx.into_diagnostics();

        #[cfg(feature = "telemetry")]
        tracing::debug!(diagnostics = diagnostics.len(), "analysis pass complete");

        Ok(diagnostics)
    }
}

/// Construct a `LintEngine` with all built-in lints enabled.
pub fn create_default_engine() -> LintEngine {
    LintEngine::new(LintRegistry::default_rules())
}
