//! Injected type and capability oracles.
//!
//! The bounds rule needs two pieces of information tree-sitter cannot give
//! it: the static classification of an indexed expression (slice, fixed
//! array, map, or something else) and whether a named type exposes a method
//! with an exact signature. Both are modeled as traits so the rule stays
//! testable against synthetic trees, with default implementations that
//! resolve what is visible syntactically in the same compilation unit.
//!
//! The defaults are deliberately conservative: anything they cannot resolve
//! comes back as [`TypeClass::Other`], which excludes the access from the
//! analysis instead of failing it.

use tree_sitter::Node;

/// Static classification of an indexed expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Slice,
    FixedArray,
    Map,
    Other,
}

/// Maps the base operand of an access expression to its [`TypeClass`].
pub trait TypeOracle: Send + Sync {
    fn classify(&self, operand: Node<'_>, source: &str) -> TypeClass;
}

/// Exact method signature, with parameter and result types spelled the way
/// they appear in Go source.
#[derive(Debug, Clone, Copy)]
pub struct MethodSig {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub results: &'static [&'static str],
}

/// Tests whether a named type exposes a method with an exact signature.
pub trait CapabilityOracle: Send + Sync {
    fn has_method(&self, root: Node<'_>, source: &str, type_name: &str, sig: &MethodSig) -> bool;
}

fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

// ============================================================================
// Declaration-based type oracle
// ============================================================================

/// Type oracle that classifies an identifier by walking the declarations
/// visible from the access site: `:=` with `make`/composite literals, `var`
/// specs, function parameters and method receivers, plus file-level `type`
/// declarations for named slice/array/map types.
pub struct DeclTypeOracle;

impl TypeOracle for DeclTypeOracle {
    fn classify(&self, operand: Node<'_>, source: &str) -> TypeClass {
        if operand.kind() != "identifier" {
            return TypeClass::Other;
        }
        let name = node_text(operand, source);
        if name.is_empty() {
            return TypeClass::Other;
        }

        let root = tree_root(operand);
        let mut scope = operand.parent();
        while let Some(node) = scope {
            let found = match node.kind() {
                "block" => classify_in_block(node, name, Some(operand.start_byte()), root, source),
                // package scope is not position-ordered
                "source_file" => classify_in_block(node, name, None, root, source),
                "function_declaration" | "method_declaration" | "func_literal" => {
                    classify_parameter(node, name, root, source)
                }
                _ => None,
            };
            if let Some(class) = found {
                return class;
            }
            scope = node.parent();
        }

        TypeClass::Other
    }
}

fn tree_root(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while let Some(parent) = current.parent() {
        current = parent;
    }
    current
}

/// Scan the direct statements of a block (or the top level of the file) for
/// a declaration of `name`. Nested blocks are separate scopes and are
/// reached through the parent chain instead.
///
/// Inside a block only declarations that end before `before` are in scope,
/// and the nearest preceding one wins, so a redeclaration later in the block
/// cannot reclassify an earlier access.
fn classify_in_block<'t>(
    block: Node<'t>,
    name: &str,
    before: Option<usize>,
    root: Node<'t>,
    source: &str,
) -> Option<TypeClass> {
    let mut cursor = block.walk();
    let statements: Vec<Node> = block.named_children(&mut cursor).collect();
    for stmt in statements.iter().rev() {
        if before.is_some_and(|limit| stmt.end_byte() > limit) {
            continue;
        }
        let found = match stmt.kind() {
            "short_var_declaration" => classify_short_var(*stmt, name, root, source),
            "var_declaration" => classify_var_declaration(*stmt, name, root, source),
            _ => None,
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn classify_short_var<'t>(
    decl: Node<'t>,
    name: &str,
    root: Node<'t>,
    source: &str,
) -> Option<TypeClass> {
    let left = decl.child_by_field_name("left")?;
    let right = decl.child_by_field_name("right")?;

    let mut left_cursor = left.walk();
    let names: Vec<Node> = left.named_children(&mut left_cursor).collect();
    let mut right_cursor = right.walk();
    let values: Vec<Node> = right.named_children(&mut right_cursor).collect();

    for (i, lhs) in names.iter().enumerate() {
        if lhs.kind() == "identifier" && node_text(*lhs, source) == name {
            return Some(match values.get(i) {
                Some(value) => classify_value(*value, root, source),
                // multi-value call on the right; nothing to resolve
                None => TypeClass::Other,
            });
        }
    }
    None
}

fn classify_var_declaration<'t>(
    decl: Node<'t>,
    name: &str,
    root: Node<'t>,
    source: &str,
) -> Option<TypeClass> {
    let mut cursor = decl.walk();
    for spec in decl.named_children(&mut cursor) {
        if spec.kind() != "var_spec" {
            continue;
        }
        if let Some(class) = classify_var_spec(spec, name, root, source) {
            return Some(class);
        }
    }
    None
}

fn classify_var_spec<'t>(
    spec: Node<'t>,
    name: &str,
    root: Node<'t>,
    source: &str,
) -> Option<TypeClass> {
    let mut name_cursor = spec.walk();
    let position = spec
        .children_by_field_name("name", &mut name_cursor)
        .position(|n| node_text(n, source) == name)?;

    if let Some(ty) = spec.child_by_field_name("type") {
        return Some(classify_type(ty, root, source, 0));
    }

    let values = spec.child_by_field_name("value")?;
    let mut value_cursor = values.walk();
    let value = values.named_children(&mut value_cursor).nth(position);
    Some(match value {
        Some(v) => classify_value(v, root, source),
        None => TypeClass::Other,
    })
}

/// Classify the parameters (and, for methods, the receiver) of the function
/// that encloses the access.
fn classify_parameter<'t>(
    func: Node<'t>,
    name: &str,
    root: Node<'t>,
    source: &str,
) -> Option<TypeClass> {
    for field in ["parameters", "receiver"] {
        let Some(list) = func.child_by_field_name(field) else {
            continue;
        };
        let mut cursor = list.walk();
        for decl in list.named_children(&mut cursor) {
            match decl.kind() {
                "parameter_declaration" => {
                    let mut name_cursor = decl.walk();
                    let matches = decl
                        .children_by_field_name("name", &mut name_cursor)
                        .any(|n| node_text(n, source) == name);
                    if matches {
                        let ty = decl.child_by_field_name("type")?;
                        return Some(classify_type(ty, root, source, 0));
                    }
                }
                "variadic_parameter_declaration" => {
                    let matches = decl
                        .child_by_field_name("name")
                        .is_some_and(|n| node_text(n, source) == name);
                    if matches {
                        // `...T` binds a slice of T
                        return Some(TypeClass::Slice);
                    }
                }
                _ => {}
            }
        }
    }
    None
}

/// Classify the right-hand side of a declaration: `make(...)` calls and
/// composite literals carry their type syntactically.
fn classify_value<'t>(value: Node<'t>, root: Node<'t>, source: &str) -> TypeClass {
    match value.kind() {
        "call_expression" => {
            let is_make = value
                .child_by_field_name("function")
                .is_some_and(|f| f.kind() == "identifier" && node_text(f, source) == "make");
            if !is_make {
                return TypeClass::Other;
            }
            let Some(args) = value.child_by_field_name("arguments") else {
                return TypeClass::Other;
            };
            let mut cursor = args.walk();
            match args.named_children(&mut cursor).next() {
                Some(ty) => classify_type(ty, root, source, 0),
                None => TypeClass::Other,
            }
        }
        "composite_literal" => match value.child_by_field_name("type") {
            Some(ty) => classify_type(ty, root, source, 0),
            None => TypeClass::Other,
        },
        _ => TypeClass::Other,
    }
}

/// How many in-file `type X Y` hops we chase before giving up.
const MAX_NAMED_TYPE_DEPTH: usize = 4;

fn classify_type<'t>(ty: Node<'t>, root: Node<'t>, source: &str, depth: usize) -> TypeClass {
    match ty.kind() {
        "slice_type" => TypeClass::Slice,
        "array_type" | "implicit_length_array_type" => TypeClass::FixedArray,
        "map_type" => TypeClass::Map,
        // indexing through *[N]T auto-dereferences; classify the pointee
        "pointer_type" | "parenthesized_type" => match ty.named_child(0) {
            Some(inner) => classify_type(inner, root, source, depth),
            None => TypeClass::Other,
        },
        "type_identifier" => {
            if depth >= MAX_NAMED_TYPE_DEPTH {
                return TypeClass::Other;
            }
            match resolve_named_type(root, node_text(ty, source), source) {
                Some(underlying) => classify_type(underlying, root, source, depth + 1),
                None => TypeClass::Other,
            }
        }
        _ => TypeClass::Other,
    }
}

/// Find the underlying type of a file-level `type Name T` declaration.
fn resolve_named_type<'t>(root: Node<'t>, name: &str, source: &str) -> Option<Node<'t>> {
    let mut cursor = root.walk();
    for decl in root.named_children(&mut cursor) {
        if decl.kind() != "type_declaration" {
            continue;
        }
        let mut spec_cursor = decl.walk();
        for spec in decl.named_children(&mut spec_cursor) {
            if spec.kind() != "type_spec" {
                continue;
            }
            let matches = spec
                .child_by_field_name("name")
                .is_some_and(|n| node_text(n, source) == name);
            if matches {
                return spec.child_by_field_name("type");
            }
        }
    }
    None
}

// ============================================================================
// File-scoped capability oracle
// ============================================================================

/// Capability oracle backed by the method declarations of the compilation
/// unit itself. A method matches when its receiver's base type (pointer
/// stripped), name, and flattened parameter/result type lists all agree with
/// the requested signature.
pub struct FileCapabilityOracle;

impl CapabilityOracle for FileCapabilityOracle {
    fn has_method(&self, root: Node<'_>, source: &str, type_name: &str, sig: &MethodSig) -> bool {
        let mut cursor = root.walk();
        for decl in root.named_children(&mut cursor) {
            if decl.kind() != "method_declaration" {
                continue;
            }
            let name_matches = decl
                .child_by_field_name("name")
                .is_some_and(|n| node_text(n, source) == sig.name);
            if !name_matches {
                continue;
            }
            let receiver_matches =
                receiver_base_type(decl, source).is_some_and(|t| t == type_name);
            if !receiver_matches {
                continue;
            }
            if signature_matches(decl, sig, source) {
                return true;
            }
        }
        false
    }
}

/// Base type name of a method's receiver, with any pointer stripped.
pub fn receiver_base_type(method: Node<'_>, source: &str) -> Option<String> {
    let receiver = method.child_by_field_name("receiver")?;
    let mut cursor = receiver.walk();
    let decl = receiver
        .named_children(&mut cursor)
        .find(|n| n.kind() == "parameter_declaration")?;
    let mut ty = decl.child_by_field_name("type")?;
    while ty.kind() == "pointer_type" || ty.kind() == "parenthesized_type" {
        ty = ty.named_child(0)?;
    }
    if ty.kind() == "generic_type" {
        ty = ty.child_by_field_name("type")?;
    }
    Some(node_text(ty, source).to_string())
}

fn signature_matches(method: Node<'_>, sig: &MethodSig, source: &str) -> bool {
    let params = match method.child_by_field_name("parameters") {
        Some(list) => flatten_parameter_types(list, source),
        None => Vec::new(),
    };
    if params != sig.params {
        return false;
    }

    let results = match method.child_by_field_name("result") {
        Some(result) if result.kind() == "parameter_list" => {
            flatten_parameter_types(result, source)
        }
        Some(result) => vec![node_text(result, source).to_string()],
        None => Vec::new(),
    };
    results == sig.results
}

/// Expand a parameter list into one type name per declared parameter, so
/// `(i, j int)` yields `["int", "int"]`.
fn flatten_parameter_types(list: Node<'_>, source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = list.walk();
    for decl in list.named_children(&mut cursor) {
        if decl.kind() != "parameter_declaration" {
            continue;
        }
        let Some(ty) = decl.child_by_field_name("type") else {
            continue;
        };
        let ty_text = node_text(ty, source).to_string();
        let mut name_cursor = decl.walk();
        let names = decl.children_by_field_name("name", &mut name_cursor).count();
        for _ in 0..names.max(1) {
            out.push(ty_text.clone());
        }
    }
    out
}
