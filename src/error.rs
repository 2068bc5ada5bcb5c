//! Error types for the checker core.
//!
//! Mirrors the shape of `logicaffeine-kernel`'s interface error module: a
//! hand-written `Display`/`Error` pair and a `Result` alias, no `thiserror`.
//! There is no source-span tracking here (lexing and parsing are out of
//! scope for this core), so variants carry the offending types/terms
//! directly instead of a span.

use std::fmt;

use crate::context::Context;
use crate::term::Type;

/// Everything that can go wrong while checking or inferring a term.
///
/// All variants are terminal: the core never attempts to recover from an
/// error mid-derivation. [`KernelError::InvariantViolation`] is distinct
/// from the rest — it signals a bug in this crate's own bookkeeping rather
/// than a type error in the input term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// A term variable has no matching assumption in context.
    UnboundVariable(String),
    /// An existential variable was referenced with no corresponding note.
    UnboundExistential(String),
    /// A type failed well-formedness during instantiation.
    IllFormedType { ty: Type, context: Context },
    /// No instantiation rule applies: a scope violation or structural
    /// mismatch between an existential and its target type.
    InstantiationFailure { existential: String, target: Type },
    /// No subtyping rule applies between the two types.
    SubtypeMismatch { sub: Type, sup: Type },
    /// `infer_app` was asked to apply a non-function, non-quantified,
    /// non-existential type.
    NotAFunction(Type),
    /// A context-structure invariant was violated: a duplicate note matched
    /// a lookup, or a `split`/`peel` target was absent from the context.
    /// This indicates a defect in the checker itself.
    InvariantViolation(String),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::UnboundVariable(name) => write!(f, "unbound variable: {}", name),
            KernelError::UnboundExistential(name) => {
                write!(f, "unbound existential variable: {{{}}}", name)
            }
            KernelError::IllFormedType { ty, context } => {
                write!(f, "ill-formed type {} under context {}", ty, context)
            }
            KernelError::InstantiationFailure { existential, target } => write!(
                f,
                "cannot instantiate {{{}}} against {}",
                existential, target
            ),
            KernelError::SubtypeMismatch { sub, sup } => {
                write!(f, "{} is not a subtype of {}", sub, sup)
            }
            KernelError::NotAFunction(ty) => write!(f, "{} is not applicable", ty),
            KernelError::InvariantViolation(msg) => {
                write!(f, "context-structure invariant violated: {}", msg)
            }
        }
    }
}

impl std::error::Error for KernelError {}

/// Alias for `std::result::Result<T, KernelError>`.
pub type KernelResult<T> = std::result::Result<T, KernelError>;
