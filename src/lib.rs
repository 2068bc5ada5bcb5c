//! A bidirectional type checker and inferencer for a minimal, explicitly
//! polymorphic lambda calculus, implementing Dunfield and Krishnaswami's
//! "Complete and Easy Bidirectional Typechecking for Higher-Rank
//! Polymorphism."
//!
//! ```text
//!               infer_expression_with(config, term)
//!                             │
//!                             ▼
//!                  checker::infer  ◀──────┐
//!                      │      │           │
//!                      ▼      ▼           │
//!              checker::check  subtype::subtype
//!                      │              │
//!                      │              ▼
//!                      │     instantiate::{instantiate_left, instantiate_right}
//!                      │              │
//!                      └──────┬───────┘
//!                             ▼
//!                        context::Context
//! ```
//!
//! `context` owns the ordered list of in-scope notes (universals,
//! existentials, solved existentials, markers, term assumptions) and every
//! structural operation on it. `term` defines the two syntactic categories
//! (`Type`, `Term`) that flow through the judgments. `fresh` hands out the
//! existential names `checker`, `subtype`, and `instantiate` all need.
//! `error` collects every way a derivation can fail.
//!
//! There is no lexer or parser here: callers build `Term`/`Type` trees
//! directly (see `Term`'s and `Type`'s constructor methods) and get back
//! either a fully elaborated term — every `TypeSlot` resolved — or a
//! [`KernelError`] describing exactly where the derivation got stuck.

mod checker;
mod context;
mod error;
mod fresh;
mod instantiate;
mod subtype;
mod term;

pub use checker::{check, infer, infer_app};
pub use context::{Context, Note};
pub use error::{KernelError, KernelResult};
pub use fresh::Generator;
pub use instantiate::{instantiate_left, instantiate_right};
pub use subtype::subtype;
pub use term::{type_of, Term, Type, TypeSlot};

/// Knobs for a single top-level checking run.
///
/// There is currently one: the prefix used when minting existential
/// variable names, which only matters for reading the `trace`/`debug`
/// logs emitted during a run, since generated names never collide with
/// user-supplied ones regardless of prefix.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub existential_prefix: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig { existential_prefix: "t".to_string() }
    }
}

/// Infer the type of `term` under the empty context, using the default
/// [`CheckerConfig`].
///
/// Returns the fully elaborated term (every `TypeSlot` resolved via the
/// final context's solutions) or the error that stopped the derivation.
pub fn infer_expression(term: &Term) -> KernelResult<Term> {
    infer_expression_with(term, &CheckerConfig::default())
}

pub fn infer_expression_with(term: &Term, config: &CheckerConfig) -> KernelResult<Term> {
    let mut gen = Generator::with_prefix(config.existential_prefix.clone());
    let (_, elaborated, delta) = infer(&Context::empty(), term, &mut gen)?;
    Ok(delta.apply_expr(&elaborated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_unit() {
        let result = infer_expression(&Term::Unit).unwrap();
        assert_eq!(type_of(&result), Type::Unit);
    }

    #[test]
    fn infers_annotated_polymorphic_identity() {
        let identity = Term::ann(
            Term::abs("x", Term::var("x")),
            Type::forall("a", Type::fun(Type::UVar("a".into()), Type::UVar("a".into()))),
        );
        let result = infer_expression(&identity).unwrap();
        assert!(matches!(type_of(&result), Type::Forall(_, _)));
    }

    #[test]
    fn respects_custom_existential_prefix() {
        let config = CheckerConfig { existential_prefix: "v".to_string() };
        let term = Term::abs("x", Term::var("x"));
        let result = infer_expression_with(&term, &config).unwrap();
        // the inferred argument/result types are existentials named with
        // the configured prefix until applied; after elaboration they are
        // resolved to themselves (no further solution), so just check this
        // ran to completion rather than erroring.
        assert!(matches!(type_of(&result), Type::Fun(_, _)));
    }

    #[test]
    fn propagates_unbound_variable_errors() {
        let err = infer_expression(&Term::var("nope")).unwrap_err();
        assert!(matches!(err, KernelError::UnboundVariable(name) if name == "nope"));
    }
}
