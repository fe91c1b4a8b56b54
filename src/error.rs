use thiserror::Error;

/// Structured error type for the goboundcheck subsystems.
///
/// The analysis pass itself never fails: partial information (an operand
/// that is not a plain identifier, an unresolvable type, a missing method
/// signature) just excludes the access from the check. The only hard
/// failures are the ones below, all upstream of the pass.
#[derive(Debug, Error)]
pub enum GoboundcheckError {
    #[error("failed to load Go grammar: {0}")]
    Grammar(String),

    #[error("tree-sitter failed to parse source")]
    Parse,
}
