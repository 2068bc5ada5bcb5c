//! Algorithmic subtyping.
//!
//! `subtype(Γ, A, B)` derives `Γ ⊢ A <: B ⊣ Δ`. The match arms below are
//! written in a fixed dispatch order: `<:∀L` is tried
//! before `<:∀R` (so `Forall <: Forall` takes the left rule), and both
//! quantifier rules are tried before `<:InstL`/`<:InstR`. Anything that
//! doesn't match a rule — including the "same name but out of scope" edge
//! cases of `<:Var`/`<:Exvar` — falls through to the final mismatch arm.

use crate::context::{Context, Note};
use crate::error::{KernelError, KernelResult};
use crate::fresh::Generator;
use crate::instantiate::{instantiate_left, instantiate_right};
use crate::term::Type;

pub fn subtype(ctx: &Context, a: &Type, b: &Type, gen: &mut Generator) -> KernelResult<Context> {
    log::trace!("subtype: {} <: {} under {}", a, b, ctx);

    match (a, b) {
        (Type::Unit, Type::Unit) => {
            log::debug!("subtype: <:Unit");
            Ok(ctx.clone())
        }

        (Type::UVar(x), Type::UVar(y)) if x == y && ctx.contains(&Note::UVar(x.clone())) => {
            log::debug!("subtype: <:Var {}", x);
            Ok(ctx.clone())
        }

        (Type::EVar(x), Type::EVar(y)) if x == y && ctx.contains(&Note::EVar(x.clone())) => {
            log::debug!("subtype: <:Exvar {{{}}}", x);
            Ok(ctx.clone())
        }

        (Type::Fun(a1, a2), Type::Fun(b1, b2)) => {
            log::debug!("subtype: <:->");
            let theta = subtype(ctx, b1, a1, gen)?;
            let a2p = theta.apply(a2);
            let b2p = theta.apply(b2);
            subtype(&theta, &a2p, &b2p, gen)
        }

        (Type::Forall(alpha, inner), _) => {
            log::debug!("subtype: <:\u{2200}L {}", alpha);
            let alpha_hat = gen.fresh();
            let extended =
                ctx.pushed_many(vec![Note::EVar(alpha_hat.clone()), Note::Marker(alpha_hat.clone())]);
            let substituted = inner.subst(&Type::UVar(alpha.clone()), &Type::EVar(alpha_hat.clone()));
            let delta = subtype(&extended, &substituted, b, gen)?;
            Ok(delta.peel(&Note::Marker(alpha_hat)))
        }

        (_, Type::Forall(beta, inner)) => {
            log::debug!("subtype: <:\u{2200}R {}", beta);
            let extended = ctx.pushed(Note::UVar(beta.clone()));
            let delta = subtype(&extended, a, inner, gen)?;
            Ok(delta.peel(&Note::UVar(beta.clone())))
        }

        (Type::EVar(alpha), _)
            if ctx.contains(&Note::EVar(alpha.clone())) && !b.free_existentials().contains(alpha.as_str()) =>
        {
            log::debug!("subtype: <:InstL {{{}}}", alpha);
            instantiate_left(ctx, alpha, b, gen)
        }

        (_, Type::EVar(alpha))
            if ctx.contains(&Note::EVar(alpha.clone())) && !a.free_existentials().contains(alpha.as_str()) =>
        {
            log::debug!("subtype: <:InstR {{{}}}", alpha);
            instantiate_right(ctx, a, alpha, gen)
        }

        _ => Err(KernelError::SubtypeMismatch { sub: a.clone(), sup: b.clone() }),
    }
}
