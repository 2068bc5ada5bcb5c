//! Existential instantiation.
//!
//! `instantiate_left(Γ, α̂, A)` derives `Γ ⊢ α̂ :=< A ⊣ Δ` ("instantiate α̂
//! so that it is a subtype of A"); `instantiate_right` is its mirror image
//! for `A <=: α̂`. `InstLSolve`/`InstRSolve` are tried before the structural
//! cases in both functions, so an existing well-formed monotype solution
//! short-circuits the introduction of sub-existentials.

use crate::context::{Context, Note};
use crate::error::{KernelError, KernelResult};
use crate::fresh::Generator;
use crate::term::Type;

pub fn instantiate_left(
    ctx: &Context,
    alpha: &str,
    a: &Type,
    gen: &mut Generator,
) -> KernelResult<Context> {
    log::trace!("instantiate_left: {{{}}} :=< {} under {}", alpha, a, ctx);

    let (_, pre) = ctx
        .split(&Note::EVar(alpha.to_string()))
        .map_err(|_| KernelError::UnboundExistential(alpha.to_string()))?;
    let pre_ctx = Context::from_notes(pre);
    if a.is_mono() && pre_ctx.well_formed(a) {
        log::debug!("instantiate_left: InstLSolve {{{}}} = {}", alpha, a);
        return ctx.replace_at(
            &Note::EVar(alpha.to_string()),
            vec![Note::Solved(alpha.to_string(), a.clone())],
        );
    }

    match a {
        Type::EVar(beta) => {
            if ctx.declared_before(alpha, beta)? {
                log::debug!("instantiate_left: InstLReach {{{}}} = {{{}}}", beta, alpha);
                ctx.replace_at(
                    &Note::EVar(beta.clone()),
                    vec![Note::Solved(beta.clone(), Type::EVar(alpha.to_string()))],
                )
            } else {
                Err(KernelError::InstantiationFailure {
                    existential: alpha.to_string(),
                    target: a.clone(),
                })
            }
        }
        Type::Fun(a1, a2) => {
            log::debug!("instantiate_left: InstLArr {{{}}}", alpha);
            let a1_hat = gen.fresh();
            let a2_hat = gen.fresh();
            let theta0 = ctx.replace_at(
                &Note::EVar(alpha.to_string()),
                vec![
                    Note::EVar(a2_hat.clone()),
                    Note::EVar(a1_hat.clone()),
                    Note::Solved(
                        alpha.to_string(),
                        Type::fun(Type::EVar(a1_hat.clone()), Type::EVar(a2_hat.clone())),
                    ),
                ],
            )?;
            let theta = instantiate_right(&theta0, a1, &a1_hat, gen)?;
            let a2_applied = theta.apply(a2);
            instantiate_left(&theta, &a2_hat, &a2_applied, gen)
        }
        Type::Forall(beta, body) => {
            log::debug!("instantiate_left: InstLAllR {{{}}} against \u{2200}{}", alpha, beta);
            let extended = ctx.pushed(Note::UVar(beta.clone()));
            let delta = instantiate_left(&extended, alpha, body, gen)?;
            Ok(delta.peel(&Note::UVar(beta.clone())))
        }
        Type::Unit | Type::UVar(_) => Err(KernelError::IllFormedType { ty: a.clone(), context: pre_ctx }),
    }
}

pub fn instantiate_right(
    ctx: &Context,
    a: &Type,
    alpha: &str,
    gen: &mut Generator,
) -> KernelResult<Context> {
    log::trace!("instantiate_right: {} <=: {{{}}} under {}", a, alpha, ctx);

    let (_, pre) = ctx
        .split(&Note::EVar(alpha.to_string()))
        .map_err(|_| KernelError::UnboundExistential(alpha.to_string()))?;
    let pre_ctx = Context::from_notes(pre);
    if a.is_mono() && pre_ctx.well_formed(a) {
        log::debug!("instantiate_right: InstRSolve {{{}}} = {}", alpha, a);
        return ctx.replace_at(
            &Note::EVar(alpha.to_string()),
            vec![Note::Solved(alpha.to_string(), a.clone())],
        );
    }

    match a {
        Type::EVar(beta) => {
            if ctx.declared_before(alpha, beta)? {
                log::debug!("instantiate_right: InstRReach {{{}}} = {{{}}}", beta, alpha);
                ctx.replace_at(
                    &Note::EVar(beta.clone()),
                    vec![Note::Solved(beta.clone(), Type::EVar(alpha.to_string()))],
                )
            } else {
                Err(KernelError::InstantiationFailure {
                    existential: alpha.to_string(),
                    target: a.clone(),
                })
            }
        }
        Type::Fun(a1, a2) => {
            log::debug!("instantiate_right: InstRArr {{{}}}", alpha);
            let a1_hat = gen.fresh();
            let a2_hat = gen.fresh();
            let theta0 = ctx.replace_at(
                &Note::EVar(alpha.to_string()),
                vec![
                    Note::EVar(a2_hat.clone()),
                    Note::EVar(a1_hat.clone()),
                    Note::Solved(
                        alpha.to_string(),
                        Type::fun(Type::EVar(a1_hat.clone()), Type::EVar(a2_hat.clone())),
                    ),
                ],
            )?;
            let theta = instantiate_left(&theta0, &a1_hat, a1, gen)?;
            let a2_applied = theta.apply(a2);
            instantiate_right(&theta, &a2_applied, &a2_hat, gen)
        }
        Type::Forall(beta, body) => {
            log::debug!("instantiate_right: InstRAllL \u{2200}{} against {{{}}}", beta, alpha);
            let c_hat = gen.fresh();
            let extended = ctx.pushed_many(vec![Note::EVar(c_hat.clone()), Note::Marker(c_hat.clone())]);
            let substituted = body.subst(&Type::UVar(beta.clone()), &Type::EVar(c_hat.clone()));
            let delta = instantiate_right(&extended, &substituted, alpha, gen)?;
            Ok(delta.peel(&Note::Marker(c_hat)))
        }
        Type::Unit | Type::UVar(_) => Err(KernelError::IllFormedType { ty: a.clone(), context: pre_ctx }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inst_left_solve_resolves_monotype() {
        let ctx = Context::from_notes(vec![Note::EVar("a".into())]);
        let mut gen = Generator::new();
        let delta = instantiate_left(&ctx, "a", &Type::Unit, &mut gen).unwrap();
        assert_eq!(delta.solution("a").unwrap(), Some(Type::Unit));
    }

    #[test]
    fn inst_left_reach_links_to_older_existential() {
        // a older than b: [EVar(b), EVar(a)]
        let ctx = Context::from_notes(vec![Note::EVar("b".into()), Note::EVar("a".into())]);
        let mut gen = Generator::new();
        let delta = instantiate_left(&ctx, "b", &Type::EVar("a".into()), &mut gen).unwrap();
        assert_eq!(delta.solution("b").unwrap(), Some(Type::EVar("a".into())));
    }

    #[test]
    fn inst_left_reach_errors_on_scope_violation() {
        // b older than a; instantiating a to EVar(b) (b newer) is a scope violation.
        let ctx = Context::from_notes(vec![Note::EVar("a".into()), Note::EVar("b".into())]);
        let mut gen = Generator::new();
        assert!(instantiate_left(&ctx, "a", &Type::EVar("b".into()), &mut gen).is_err());
    }

    #[test]
    fn inst_left_arr_splits_into_two_fresh_existentials() {
        let ctx = Context::from_notes(vec![Note::EVar("a".into())]);
        let mut gen = Generator::new();
        let target = Type::fun(Type::Unit, Type::Unit);
        let delta = instantiate_left(&ctx, "a", &target, &mut gen).unwrap();
        assert_eq!(delta.apply(&Type::EVar("a".into())), target);
    }

    #[test]
    fn inst_right_all_l_peels_marker() {
        let ctx = Context::from_notes(vec![Note::EVar("a".into())]);
        let mut gen = Generator::new();
        let poly = Type::forall("x", Type::UVar("x".into()));
        let delta = instantiate_right(&ctx, &poly, "a", &mut gen).unwrap();
        // the marker and its existential must not leak into the result
        assert!(delta.notes().iter().all(|n| !matches!(n, Note::Marker(_))));
    }

    #[test]
    fn instantiating_an_existential_not_in_scope_is_unbound_not_invariant_violation() {
        let ctx = Context::empty();
        let mut gen = Generator::new();
        let err = instantiate_left(&ctx, "ghost", &Type::Unit, &mut gen).unwrap_err();
        assert!(matches!(err, KernelError::UnboundExistential(name) if name == "ghost"));
    }

    #[test]
    fn instantiating_against_an_out_of_scope_universal_is_ill_formed() {
        let ctx = Context::from_notes(vec![Note::EVar("a".into())]);
        let mut gen = Generator::new();
        let err = instantiate_left(&ctx, "a", &Type::UVar("nope".into()), &mut gen).unwrap_err();
        assert!(matches!(err, KernelError::IllFormedType { .. }));
    }
}
