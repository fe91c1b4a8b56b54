use crate::diagnostics::{Diagnostic, Span};
use crate::level::LintLevel;
use std::collections::HashMap;
use tree_sitter::Node;

/// High-level categories used to group lints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LintCategory {
    /// Lints that detect potential memory-safety or panic hazards.
    Security,
}

impl LintCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LintCategory::Security => "security",
        }
    }
}

/// Static metadata describing a lint rule.
#[derive(Debug)]
pub struct LintDescriptor {
    pub name: &'static str,
    pub category: LintCategory,
    pub description: &'static str,
}

impl LintDescriptor {
    pub const fn new(
        name: &'static str,
        category: LintCategory,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            category,
            description,
        }
    }
}

/// A single lint rule that can inspect a syntax tree.
pub trait LintRule: Send + Sync {
    fn descriptor(&self) -> &'static LintDescriptor;
    fn check(&self, root: Node, source: &str, ctx: &mut LintContext);
}

/// Per-lint configuration derived from `goboundcheck.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintSettings {
    levels: HashMap<String, LintLevel>,
}

impl LintSettings {
    #[must_use]
    pub fn with_config_levels(mut self, levels: HashMap<String, LintLevel>) -> Self {
        self.levels.extend(levels);
        self
    }

    #[must_use]
    pub fn disable(mut self, disabled: impl IntoIterator<Item = String>) -> Self {
        for name in disabled {
            self.levels.insert(name, LintLevel::Allow);
        }
        self
    }

    pub fn level_for(&self, lint_name: &str) -> LintLevel {
        self.levels.get(lint_name).copied().unwrap_or_default()
    }
}

/// Mutable context passed to lint rules while traversing a file.
pub struct LintContext {
    settings: LintSettings,
    diagnostics: Vec<Diagnostic>,
}

impl LintContext {
    pub fn new(settings: LintSettings) -> Self {
        Self {
            settings,
            diagnostics: Vec::new(),
        }
    }

    /// Report a diagnostic anchored at `node`, honoring configured levels.
    pub fn report_node(
        &mut self,
        lint: &'static LintDescriptor,
        node: Node,
        message: impl Into<String>,
    ) {
        let level = self.settings.level_for(lint.name);
        if level == LintLevel::Allow {
            return;
        }

        self.diagnostics.push(Diagnostic {
            lint,
            level,
            file: None,
            span: Span::from_range(node.range()),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Registry of the lint rules an engine runs over each file.
pub struct LintRegistry {
    rules: Vec<Box<dyn LintRule>>,
}

impl LintRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// All built-in rules.
    pub fn default_rules() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::rules::BoundsCheckRule::new()));
        registry
    }

    pub fn register(&mut self, rule: Box<dyn LintRule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn LintRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static LintDescriptor> + '_ {
        self.rules.iter().map(|r| r.descriptor())
    }

    pub fn get(&self, name: &str) -> Option<&'static LintDescriptor> {
        self.descriptors().find(|d| d.name == name)
    }
}

impl Default for LintRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_to_warn() {
        let settings = LintSettings::default();
        assert_eq!(settings.level_for("unchecked_bounds_access"), LintLevel::Warn);
    }

    #[test]
    fn disabled_lint_maps_to_allow() {
        let settings =
            LintSettings::default().disable(vec!["unchecked_bounds_access".to_string()]);
        assert_eq!(
            settings.level_for("unchecked_bounds_access"),
            LintLevel::Allow
        );
    }

    #[test]
    fn config_levels_override_default() {
        let mut levels = HashMap::new();
        levels.insert("unchecked_bounds_access".to_string(), LintLevel::Error);
        let settings = LintSettings::default().with_config_levels(levels);
        assert_eq!(
            settings.level_for("unchecked_bounds_access"),
            LintLevel::Error
        );
    }

    #[test]
    fn registry_lists_builtin_rules() {
        let registry = LintRegistry::default_rules();
        assert!(registry.get("unchecked_bounds_access").is_some());
        assert!(registry.get("no_such_lint").is_none());
    }
}
