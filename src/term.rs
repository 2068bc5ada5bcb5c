//! Type and term representations for the bidirectional checker.
//!
//! There is no dependent typing here: types and terms are two distinct
//! syntactic categories, unlike a unified calculus-of-constructions term.
//! Names are opaque owned strings; equality is structural.

use std::collections::HashSet;
use std::fmt;

/// A type in the rank-N polymorphic lambda calculus.
///
/// `UVar` and `EVar` share a name space only by convention: the fresh-name
/// generator (`fresh::Generator`) is responsible for keeping existential
/// names disjoint from whatever universal names the caller supplies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// The unit type.
    Unit,
    /// A rigid, universally quantified type variable.
    UVar(String),
    /// An existential (unification) variable.
    EVar(String),
    /// Universal quantification, binding `name` in `body`.
    Forall(String, Box<Type>),
    /// A function type `domain -> codomain`.
    Fun(Box<Type>, Box<Type>),
}

impl Type {
    pub fn forall(name: impl Into<String>, body: Type) -> Type {
        Type::Forall(name.into(), Box::new(body))
    }

    pub fn fun(domain: Type, codomain: Type) -> Type {
        Type::Fun(Box::new(domain), Box::new(codomain))
    }

    /// A type is a monotype iff it has no `Forall` node anywhere in it.
    pub fn is_mono(&self) -> bool {
        match self {
            Type::Unit | Type::UVar(_) | Type::EVar(_) => true,
            Type::Forall(_, _) => false,
            Type::Fun(a, b) => a.is_mono() && b.is_mono(),
        }
    }

    /// The set of free existential variables (never universals) in this type.
    ///
    /// Used by `<:InstL`/`<:InstR`'s occurs check.
    pub fn free_existentials(&self) -> HashSet<&str> {
        let mut out = HashSet::new();
        self.collect_free_existentials(&mut out);
        out
    }

    fn collect_free_existentials<'a>(&'a self, out: &mut HashSet<&'a str>) {
        match self {
            Type::Unit | Type::UVar(_) => {}
            Type::EVar(name) => {
                out.insert(name.as_str());
            }
            Type::Forall(_, body) => body.collect_free_existentials(out),
            Type::Fun(a, b) => {
                a.collect_free_existentials(out);
                b.collect_free_existentials(out);
            }
        }
    }

    /// Replace every structural occurrence of `needle` with `replacement`.
    ///
    /// Quantifier binders are not alpha-renamed: this relies on the fresh
    /// generator handing out names that never collide with a binder already
    /// in scope.
    pub fn subst(&self, needle: &Type, replacement: &Type) -> Type {
        if self == needle {
            return replacement.clone();
        }
        match self {
            Type::Unit | Type::UVar(_) | Type::EVar(_) => self.clone(),
            Type::Forall(name, body) => {
                Type::Forall(name.clone(), Box::new(body.subst(needle, replacement)))
            }
            Type::Fun(a, b) => Type::Fun(
                Box::new(a.subst(needle, replacement)),
                Box::new(b.subst(needle, replacement)),
            ),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unit => write!(f, "Unit"),
            Type::UVar(name) => write!(f, "{}", name),
            Type::EVar(name) => write!(f, "{{{}}}", name),
            Type::Forall(name, body) => write!(f, "\u{2200}{}. {}", name, body),
            Type::Fun(a, b) => write!(f, "({} -> {})", a, b),
        }
    }
}

/// A term's type-slot: empty before elaboration, filled in after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSlot {
    Unset,
    Set(Type),
}

impl TypeSlot {
    pub fn get(&self) -> Option<&Type> {
        match self {
            TypeSlot::Unset => None,
            TypeSlot::Set(ty) => Some(ty),
        }
    }
}

impl From<Type> for TypeSlot {
    fn from(ty: Type) -> Self {
        TypeSlot::Set(ty)
    }
}

/// A term in the surface calculus.
///
/// Every node that can carry an inferred type has a [`TypeSlot`]; on input
/// these may be [`TypeSlot::Unset`], on output (after `infer_expression`)
/// they are all [`TypeSlot::Set`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Unit,
    Var(String, TypeSlot),
    Abs(String, TypeSlot, Box<Term>),
    App(Box<Term>, Box<Term>, TypeSlot),
    Ann(Box<Term>, Type),
    Let(String, Box<Term>, Box<Term>),
}

impl Term {
    pub fn var(name: impl Into<String>) -> Term {
        Term::Var(name.into(), TypeSlot::Unset)
    }

    pub fn abs(arg: impl Into<String>, body: Term) -> Term {
        Term::Abs(arg.into(), TypeSlot::Unset, Box::new(body))
    }

    pub fn app(func: Term, arg: Term) -> Term {
        Term::App(Box::new(func), Box::new(arg), TypeSlot::Unset)
    }

    pub fn ann(body: Term, ty: Type) -> Term {
        Term::Ann(Box::new(body), ty)
    }

    pub fn let_in(name: impl Into<String>, bound: Term, body: Term) -> Term {
        Term::Let(name.into(), Box::new(bound), Box::new(body))
    }
}

/// The type carried by an already-elaborated term.
///
/// Panics if a relevant slot is still [`TypeSlot::Unset`] — this function is
/// only meaningful after `infer_expression` has run to completion.
pub fn type_of(term: &Term) -> Type {
    match term {
        Term::Unit => Type::Unit,
        Term::Var(name, slot) => slot
            .get()
            .cloned()
            .unwrap_or_else(|| panic!("type_of: unset type slot on variable `{}`", name)),
        Term::Abs(_, arg_slot, body) => {
            let arg_ty = arg_slot
                .get()
                .cloned()
                .unwrap_or_else(|| panic!("type_of: unset parameter type slot"));
            Type::fun(arg_ty, type_of(body))
        }
        Term::App(_, _, slot) => slot
            .get()
            .cloned()
            .unwrap_or_else(|| panic!("type_of: unset result type slot on application")),
        Term::Ann(_, ty) => ty.clone(),
        Term::Let(_, _, body) => type_of(body),
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Unit => write!(f, "()"),
            Term::Var(name, _) => write!(f, "{}", name),
            Term::Abs(arg, _, body) => write!(f, "(\\{}. {})", arg, body),
            Term::App(func, arg, _) => write!(f, "({} {})", func, arg),
            Term::Ann(body, ty) => write!(f, "({} : {})", body, ty),
            Term::Let(name, bound, body) => write!(f, "(let {} = {} in {})", name, bound, body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_mono_rejects_forall() {
        assert!(Type::Unit.is_mono());
        assert!(Type::fun(Type::Unit, Type::Unit).is_mono());
        assert!(!Type::forall("a", Type::UVar("a".into())).is_mono());
    }

    #[test]
    fn free_existentials_ignores_universals() {
        let ty = Type::fun(Type::UVar("a".into()), Type::EVar("e1".into()));
        let free = ty.free_existentials();
        assert!(free.contains("e1"));
        assert!(!free.contains("a"));
    }

    #[test]
    fn free_existentials_respects_forall_scope() {
        // foralls never bind existentials, so this is just a sanity check
        // that traversal descends into the quantifier body.
        let ty = Type::forall("a", Type::EVar("e1".into()));
        assert!(ty.free_existentials().contains("e1"));
    }

    #[test]
    fn subst_replaces_structural_occurrences() {
        let ty = Type::fun(Type::EVar("e1".into()), Type::EVar("e1".into()));
        let replaced = ty.subst(&Type::EVar("e1".into()), &Type::Unit);
        assert_eq!(replaced, Type::fun(Type::Unit, Type::Unit));
    }

    #[test]
    fn subst_is_identity_when_absent() {
        let ty = Type::fun(Type::Unit, Type::UVar("a".into()));
        let replaced = ty.subst(&Type::EVar("e1".into()), &Type::Unit);
        assert_eq!(replaced, ty);
    }

    #[test]
    fn type_of_abs_builds_function_type() {
        let body = Term::Var("x".into(), TypeSlot::Set(Type::Unit));
        let abs = Term::Abs("x".into(), TypeSlot::Set(Type::Unit), Box::new(body));
        assert_eq!(type_of(&abs), Type::fun(Type::Unit, Type::Unit));
    }

    #[test]
    fn type_of_let_is_type_of_body() {
        let bound = Term::Unit;
        let body = Term::Var("y".into(), TypeSlot::Set(Type::Unit));
        let let_term = Term::Let("y".into(), Box::new(bound), Box::new(body));
        assert_eq!(type_of(&let_term), Type::Unit);
    }
}
