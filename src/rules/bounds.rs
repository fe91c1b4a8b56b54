//! unchecked_bounds_access - flags slice/array accesses with no enclosing guard.
//!
//! For every index or slicing expression on a directly-named container the
//! rule scans the chain of enclosing nodes for one of three guard shapes:
//!
//! 1. an `if` whose condition contains a `len`/`cap` call on the container,
//!    anywhere inside its `&&`/`||`/`==` structure;
//! 2. a `for ... range` over the container whose key variable is the index;
//! 3. an enclosing `Less` or `Swap` method of a type satisfying the sort
//!    capability set (`Len() int`, `Less(int, int) bool`, `Swap(int, int)`),
//!    when the index is one of the method's own parameters.
//!
//! The condition match is structural only: neither the branch actually taken
//! nor the direction of the comparison is verified. That permissiveness is
//! part of the rule's contract, not an oversight.

use crate::lint::{LintCategory, LintContext, LintDescriptor, LintRule};
use crate::oracle::{
    CapabilityOracle, DeclTypeOracle, FileCapabilityOracle, MethodSig, TypeClass, TypeOracle,
    receiver_base_type,
};
use crate::visitor::walk_with_ancestors;
use tree_sitter::Node;

pub static UNCHECKED_BOUNDS_ACCESS: LintDescriptor = LintDescriptor::new(
    "unchecked_bounds_access",
    LintCategory::Security,
    "Checks that slice and array access is not out of bounds.",
);

/// The one message this rule ever emits.
pub const BOUNDS_MESSAGE: &str =
    "Slice or array access is not enclosed in an if-statement that validates capacity!";

const LEN_SIG: MethodSig = MethodSig {
    name: "Len",
    params: &[],
    results: &["int"],
};
const LESS_SIG: MethodSig = MethodSig {
    name: "Less",
    params: &["int", "int"],
    results: &["bool"],
};
const SWAP_SIG: MethodSig = MethodSig {
    name: "Swap",
    params: &["int", "int"],
    results: &[],
};

pub struct BoundsCheckRule {
    type_oracle: Box<dyn TypeOracle>,
    capability_oracle: Box<dyn CapabilityOracle>,
}

impl BoundsCheckRule {
    pub fn new() -> Self {
        Self::with_oracles(Box::new(DeclTypeOracle), Box::new(FileCapabilityOracle))
    }

    /// Build the rule against explicit oracles. Tests use this to drive the
    /// classifier with synthetic type information.
    pub fn with_oracles(
        type_oracle: Box<dyn TypeOracle>,
        capability_oracle: Box<dyn CapabilityOracle>,
    ) -> Self {
        Self {
            type_oracle,
            capability_oracle,
        }
    }

    /// Extract the container identifier for a candidate access, or `None`
    /// when the access is excluded from the analysis.
    ///
    /// Index expressions must resolve to a slice or fixed array; indexing a
    /// map has no bounds-check concept and anything unresolvable is skipped.
    /// Slicing expressions accept any named operand without a type gate.
    fn container_name<'s>(&self, access: Node<'_>, source: &'s str) -> Option<&'s str> {
        let operand = access.child_by_field_name("operand")?;
        if operand.kind() != "identifier" {
            return None;
        }
        let name = operand.utf8_text(source.as_bytes()).ok()?;

        if access.kind() == "index_expression" {
            match self.type_oracle.classify(operand, source) {
                TypeClass::Slice | TypeClass::FixedArray => {}
                TypeClass::Map | TypeClass::Other => return None,
            }
        }
        Some(name)
    }

    fn is_guard<'t>(
        &self,
        ancestor: Node<'t>,
        access: Node<'t>,
        ident: &str,
        root: Node<'t>,
        source: &str,
    ) -> bool {
        match ancestor.kind() {
            "if_statement" => if_checks_len_or_cap(ancestor, ident, source),
            "for_statement" => is_range_index_access(ancestor, ident, access, source),
            "method_declaration" => {
                self.is_sort_interface_method_access(ancestor, access, root, source)
            }
            _ => false,
        }
    }

    /// Guard shape (3): the access sits inside a `Less` or `Swap` method of
    /// a sortable type and indexes with one of the method's parameters. The
    /// calling framework guarantees those indices are in range.
    fn is_sort_interface_method_access<'t>(
        &self,
        method: Node<'t>,
        access: Node<'t>,
        root: Node<'t>,
        source: &str,
    ) -> bool {
        let Some(name) = method.child_by_field_name("name") else {
            return false;
        };
        let name = name.utf8_text(source.as_bytes()).unwrap_or("");
        if name != "Less" && name != "Swap" {
            return false;
        }

        let Some(receiver_type) = receiver_base_type(method, source) else {
            return false;
        };
        let sortable = [&LEN_SIG, &LESS_SIG, &SWAP_SIG].iter().all(|sig| {
            self.capability_oracle
                .has_method(root, source, &receiver_type, sig)
        });
        if !sortable {
            return false;
        }

        let Some(index) = index_identifier(access, source) else {
            return false;
        };
        is_method_parameter(index, method, source)
    }
}

impl Default for BoundsCheckRule {
    fn default() -> Self {
        Self::new()
    }
}

impl LintRule for BoundsCheckRule {
    fn descriptor(&self) -> &'static LintDescriptor {
        &UNCHECKED_BOUNDS_ACCESS
    }

    fn check(&self, root: Node, source: &str, ctx: &mut LintContext) {
        walk_with_ancestors(root, &mut |node, ancestors| {
            if node.kind() != "index_expression" && node.kind() != "slice_expression" {
                return true;
            }
            let Some(ident) = self.container_name(node, source) else {
                return true;
            };

            let guarded = ancestors
                .iter()
                .rev()
                .any(|ancestor| self.is_guard(*ancestor, node, ident, root, source));
            if guarded {
                return true;
            }

            ctx.report_node(&UNCHECKED_BOUNDS_ACCESS, node, BOUNDS_MESSAGE);
            // nested accesses are reached by the outer traversal
            false
        });
    }
}

// ============================================================================
// Guard shape (1): conditional length/capacity check
// ============================================================================

fn if_checks_len_or_cap(if_stmt: Node<'_>, ident: &str, source: &str) -> bool {
    let Some(cond) = if_stmt.child_by_field_name("condition") else {
        return false;
    };
    condition_has_len_cap_call(cond, ident, source)
}

/// Recursive boolean-guard evaluator.
///
/// `&&`, `||` and `==` combine sub-conditions, so both operands are searched;
/// at every binary node a direct `len(ident)`/`cap(ident)` operand also
/// matches, which keeps plain comparisons like `cap(x) > 30` working no
/// matter which side the call sits on. No other leaf shape matches - a guard
/// hidden behind a helper function is never recognized.
fn condition_has_len_cap_call(expr: Node<'_>, ident: &str, source: &str) -> bool {
    let expr = unwrap_parens(expr);
    if expr.kind() != "binary_expression" {
        return false;
    }
    let (Some(left), Some(right)) = (
        expr.child_by_field_name("left"),
        expr.child_by_field_name("right"),
    ) else {
        return false;
    };

    let operator = expr
        .child_by_field_name("operator")
        .and_then(|op| op.utf8_text(source.as_bytes()).ok())
        .unwrap_or("");
    if matches!(operator, "&&" | "||" | "==")
        && (condition_has_len_cap_call(left, ident, source)
            || condition_has_len_cap_call(right, ident, source))
    {
        return true;
    }

    is_len_or_cap_call_on(left, ident, source) || is_len_or_cap_call_on(right, ident, source)
}

fn is_len_or_cap_call_on(expr: Node<'_>, ident: &str, source: &str) -> bool {
    let expr = unwrap_parens(expr);
    if expr.kind() != "call_expression" {
        return false;
    }
    let callee_is_len_or_cap = expr.child_by_field_name("function").is_some_and(|f| {
        f.kind() == "identifier"
            && matches!(f.utf8_text(source.as_bytes()).unwrap_or(""), "len" | "cap")
    });
    if !callee_is_len_or_cap {
        return false;
    }

    let Some(args) = expr.child_by_field_name("arguments") else {
        return false;
    };
    let mut cursor = args.walk();
    args.named_children(&mut cursor).any(|arg| {
        arg.kind() == "identifier" && arg.utf8_text(source.as_bytes()).unwrap_or("") == ident
    })
}

fn unwrap_parens(mut expr: Node<'_>) -> Node<'_> {
    while expr.kind() == "parenthesized_expression" {
        match expr.named_child(0) {
            Some(inner) => expr = inner,
            None => break,
        }
    }
    expr
}

// ============================================================================
// Guard shape (2): range-style iteration
// ============================================================================

/// True when `access` indexes `ident` with the key variable of a `for ...
/// range ident` loop. The index is then mechanically derived from safe
/// iteration.
fn is_range_index_access<'t>(
    for_stmt: Node<'t>,
    ident: &str,
    access: Node<'t>,
    source: &str,
) -> bool {
    let mut cursor = for_stmt.walk();
    let Some(range) = for_stmt
        .named_children(&mut cursor)
        .find(|n| n.kind() == "range_clause")
    else {
        return false;
    };

    let ranges_over_ident = range.child_by_field_name("right").is_some_and(|rhs| {
        rhs.kind() == "identifier" && rhs.utf8_text(source.as_bytes()).unwrap_or("") == ident
    });
    if !ranges_over_ident {
        return false;
    }

    let Some(index) = index_identifier(access, source) else {
        return false;
    };
    let Some(bindings) = range.child_by_field_name("left") else {
        return false;
    };
    let mut binding_cursor = bindings.walk();
    let Some(key) = bindings.named_children(&mut binding_cursor).next() else {
        return false;
    };
    key.kind() == "identifier" && key.utf8_text(source.as_bytes()).unwrap_or("") == index
}

/// The index operand of an index expression, when it is a bare identifier.
fn index_identifier<'s>(access: Node<'_>, source: &'s str) -> Option<&'s str> {
    if access.kind() != "index_expression" {
        return None;
    }
    let index = access.child_by_field_name("index")?;
    if index.kind() != "identifier" {
        return None;
    }
    index.utf8_text(source.as_bytes()).ok()
}

fn is_method_parameter(name: &str, method: Node<'_>, source: &str) -> bool {
    let Some(params) = method.child_by_field_name("parameters") else {
        return false;
    };
    let mut cursor = params.walk();
    for decl in params.named_children(&mut cursor) {
        if decl.kind() != "parameter_declaration" {
            continue;
        }
        let mut name_cursor = decl.walk();
        let matches = decl
            .children_by_field_name("name", &mut name_cursor)
            .any(|n| n.utf8_text(source.as_bytes()).unwrap_or("") == name);
        if matches {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::LintSettings;
    use crate::parser::parse_source;

    fn run_rule(rule: &BoundsCheckRule, src: &str) -> Vec<usize> {
        let tree = parse_source(src).expect("parse");
        let mut ctx = LintContext::new(LintSettings::default());
        rule.check(tree.root_node(), src, &mut ctx);
        ctx.into_diagnostics()
            .into_iter()
            .map(|d| d.span.start.row)
            .collect()
    }

    fn rows(src: &str) -> Vec<usize> {
        run_rule(&BoundsCheckRule::new(), src)
    }

    #[test]
    fn condition_evaluator_finds_guard_buried_in_disjunction() {
        let src =
            "package p\n\nfunc f(x []int) {\n\tif 5 == 4 || 2 == 3 || cap(x) > 30 {\n\t\t_ = x[30]\n\t}\n}\n";
        assert!(rows(src).is_empty());
    }

    #[test]
    fn condition_evaluator_accepts_parenthesized_guards() {
        let src =
            "package p\n\nfunc f(x []int) {\n\tif (len(x) > 30) && true {\n\t\t_ = x[30]\n\t}\n}\n";
        assert!(rows(src).is_empty());
    }

    #[test]
    fn condition_evaluator_ignores_other_calls() {
        let src =
            "package p\n\nfunc f(x []int) {\n\tif check() == 0 {\n\t\t_ = x[1000]\n\t}\n}\n";
        assert_eq!(rows(src), vec![5]);
    }

    #[test]
    fn condition_on_different_container_does_not_count() {
        let src =
            "package p\n\nfunc f(x []int, y []int) {\n\tif len(y) > 30 {\n\t\t_ = x[30]\n\t}\n}\n";
        assert_eq!(rows(src), vec![5]);
    }

    #[test]
    fn field_chain_operands_are_excluded() {
        let src = "package p\n\nfunc f(s state) {\n\t_ = s.items[0]\n}\n";
        assert!(rows(src).is_empty());
    }

    #[test]
    fn stub_type_oracle_drives_the_verdict() {
        struct AlwaysSlice;
        impl TypeOracle for AlwaysSlice {
            fn classify(&self, _operand: Node<'_>, _source: &str) -> TypeClass {
                TypeClass::Slice
            }
        }
        struct NoCapability;
        impl CapabilityOracle for NoCapability {
            fn has_method(
                &self,
                _root: Node<'_>,
                _source: &str,
                _type_name: &str,
                _sig: &MethodSig,
            ) -> bool {
                false
            }
        }

        // `y` has no visible declaration; the default oracle would skip it,
        // the stub classifies it as a slice and the access is flagged.
        let src = "package p\n\nfunc f() {\n\t_ = y[0]\n}\n";
        assert!(rows(src).is_empty());

        let stubbed =
            BoundsCheckRule::with_oracles(Box::new(AlwaysSlice), Box::new(NoCapability));
        assert_eq!(run_rule(&stubbed, src), vec![4]);
    }
}
