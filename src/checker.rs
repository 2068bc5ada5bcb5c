//! The bidirectional judgments themselves: `check`, `infer`, `infer_app`,
//! plus the top-level entry points `infer_expression` and
//! `infer_expression_with`.
//!
//! Every judgment returns a freshly-built `Term` alongside its resulting
//! context rather than mutating a shared `TypeSlot` in place: a term can be
//! checked or applied more than once as a derivation backtracks through
//! alternative rules, and a slot written by one attempt must not leak into
//! another, so each judgment builds its own output term bottom-up instead
//! of writing through a shared reference.

use crate::context::{Context, Note};
use crate::error::{KernelError, KernelResult};
use crate::fresh::Generator;
use crate::subtype::subtype;
use crate::term::{Term, Type, TypeSlot};

/// `Γ ⊢ e ⇐ A ⊣ Δ`. Returns the elaborated term and the resulting context.
pub fn check(ctx: &Context, term: &Term, expected: &Type, gen: &mut Generator) -> KernelResult<(Term, Context)> {
    log::trace!("check: {} \u{21d0} {} under {}", term, expected, ctx);

    match (term, expected) {
        (Term::Unit, Type::Unit) => {
            log::debug!("check: 1I");
            Ok((Term::Unit, ctx.clone()))
        }

        (Term::Abs(x, _, body), Type::Fun(arg_ty, res_ty)) => {
            log::debug!("check: \u{2192}I {}", x);
            let extended = ctx.pushed(Note::Assump(x.clone(), (**arg_ty).clone()));
            let (body_prime, delta_prime) = check(&extended, body, res_ty, gen)?;
            let assumption = Note::Assump(x.clone(), (**arg_ty).clone());
            let delta = delta_prime.peel(&assumption);
            Ok((
                Term::Abs(x.clone(), TypeSlot::Set((**arg_ty).clone()), Box::new(body_prime)),
                delta,
            ))
        }

        (_, Type::Forall(alpha, body_ty)) => {
            log::debug!("check: \u{2200}I {}", alpha);
            let extended = ctx.pushed(Note::UVar(alpha.clone()));
            let (term_prime, delta_prime) = check(&extended, term, body_ty, gen)?;
            let delta = delta_prime.peel(&Note::UVar(alpha.clone()));
            Ok((term_prime, delta))
        }

        (_, _) => {
            log::debug!("check: Sub");
            let (synthesized, term_prime, theta) = infer(ctx, term, gen)?;
            let delta = subtype(&theta, &theta.apply(&synthesized), &theta.apply(expected), gen)?;
            Ok((delta.apply_expr(&term_prime), delta))
        }
    }
}

/// `Γ ⊢ e ⇒ A ⊣ Δ`. Returns the synthesized type, the elaborated term, and
/// the resulting context.
pub fn infer(ctx: &Context, term: &Term, gen: &mut Generator) -> KernelResult<(Type, Term, Context)> {
    log::trace!("infer: {} \u{21d2} ? under {}", term, ctx);

    match term {
        Term::Unit => {
            log::debug!("infer: 1I\u{21d2}");
            Ok((Type::Unit, Term::Unit, ctx.clone()))
        }

        Term::Var(name, _) => {
            log::debug!("infer: Var {}", name);
            match ctx.assump(name)? {
                Some(ty) => Ok((ty.clone(), Term::Var(name.clone(), TypeSlot::Set(ty)), ctx.clone())),
                None => Err(KernelError::UnboundVariable(name.clone())),
            }
        }

        Term::Ann(body, declared) => {
            log::debug!("infer: Anno {}", declared);
            let (body_prime, delta) = check(ctx, body, declared, gen)?;
            Ok((declared.clone(), Term::Ann(Box::new(body_prime), declared.clone()), delta))
        }

        Term::Abs(x, _, body) => {
            log::debug!("infer: \u{2192}I\u{21d2} {}", x);
            let arg_hat = gen.fresh();
            let res_hat = gen.fresh();
            let extended = ctx.pushed_many(vec![
                Note::Assump(x.clone(), Type::EVar(arg_hat.clone())),
                Note::EVar(res_hat.clone()),
                Note::EVar(arg_hat.clone()),
            ]);
            let (body_prime, delta_prime) = check(&extended, body, &Type::EVar(res_hat.clone()), gen)?;
            let assumption = Note::Assump(x.clone(), Type::EVar(arg_hat.clone()));
            let delta = delta_prime.peel(&assumption);
            let fn_ty = Type::fun(Type::EVar(arg_hat.clone()), Type::EVar(res_hat.clone()));
            Ok((
                fn_ty,
                Term::Abs(x.clone(), TypeSlot::Set(Type::EVar(arg_hat)), Box::new(body_prime)),
                delta,
            ))
        }

        Term::App(func, arg, _) => {
            log::debug!("infer: \u{2192}E");
            let (fn_ty, func_prime, theta) = infer(ctx, func, gen)?;
            let applied_fn_ty = theta.apply(&fn_ty);
            let (result_ty, arg_prime, delta) = infer_app(&theta, &applied_fn_ty, arg, gen)?;
            Ok((
                result_ty.clone(),
                Term::App(Box::new(func_prime), Box::new(arg_prime), TypeSlot::Set(result_ty)),
                delta,
            ))
        }

        Term::Let(x, bound, body) => {
            log::debug!("infer: Let {}", x);
            let (bound_ty, bound_prime, theta) = infer(ctx, bound, gen)?;
            let res_hat = gen.fresh();
            let extended =
                theta.pushed_many(vec![Note::Assump(x.clone(), bound_ty.clone()), Note::EVar(res_hat.clone())]);
            let (body_prime, delta_prime) = check(&extended, body, &Type::EVar(res_hat.clone()), gen)?;
            let assumption = Note::Assump(x.clone(), bound_ty);
            let delta = delta_prime.peel(&assumption);
            Ok((
                delta.apply(&Type::EVar(res_hat)),
                Term::Let(x.clone(), Box::new(bound_prime), Box::new(body_prime)),
                delta,
            ))
        }
    }
}

/// `Γ ⊢ A \u{2022} e \u{21d3}\u{21d2} C ⊣ Δ`: applying a function of type `A` to `e`.
pub fn infer_app(ctx: &Context, fn_ty: &Type, arg: &Term, gen: &mut Generator) -> KernelResult<(Type, Term, Context)> {
    log::trace!("infer_app: {} \u{2022} {} under {}", fn_ty, arg, ctx);

    match fn_ty {
        Type::Forall(alpha, body) => {
            log::debug!("infer_app: \u{2200}App {}", alpha);
            let alpha_hat = gen.fresh();
            let extended = ctx.pushed(Note::EVar(alpha_hat.clone()));
            let substituted = body.subst(&Type::UVar(alpha.clone()), &Type::EVar(alpha_hat));
            infer_app(&extended, &substituted, arg, gen)
        }

        Type::EVar(alpha) => {
            log::debug!("infer_app: \u{03b1}\u{0302}App {{{}}}", alpha);
            let a1_hat = gen.fresh();
            let a2_hat = gen.fresh();
            let ctx_prime = ctx.replace_at(
                &Note::EVar(alpha.clone()),
                vec![
                    Note::Solved(alpha.clone(), Type::fun(Type::EVar(a1_hat.clone()), Type::EVar(a2_hat.clone()))),
                    Note::EVar(a1_hat.clone()),
                    Note::EVar(a2_hat.clone()),
                ],
            )?;
            let (arg_prime, delta) = check(&ctx_prime, arg, &Type::EVar(a1_hat), gen)?;
            Ok((Type::EVar(a2_hat), arg_prime, delta))
        }

        Type::Fun(arg_ty, res_ty) => {
            log::debug!("infer_app: \u{2192}App");
            let (arg_prime, delta) = check(ctx, arg, arg_ty, gen)?;
            Ok(((**res_ty).clone(), arg_prime, delta))
        }

        _ => Err(KernelError::NotAFunction(fn_ty.clone())),
    }
}
