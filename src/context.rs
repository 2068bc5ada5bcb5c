//! The ordered typing context.
//!
//! Notes are kept **newest-first**: what the literature writes as
//! `Γ, α` (append on the right) is `α :: Γ` here — the newly-added note
//! sits at index 0. Every operation below is phrased in terms of that
//! convention; see the module-level doc on `lib.rs` for the rationale.
//!
//! Contexts are immutable value sequences: every method here
//! takes `&self` and returns a new `Context` rather than mutating in
//! place, so a context handed to a caller is never aliased-mutated later.

use std::fmt;

use crate::error::{KernelError, KernelResult};
use crate::term::{Term, TypeSlot};
use crate::term::Type;

/// A single entry in a typing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    /// A bound rigid type variable is in scope.
    UVar(String),
    /// An unsolved existential is in scope.
    EVar(String),
    /// Existential `name` has been solved to a monotype.
    Solved(String, Type),
    /// A scope marker (▶), used to delimit and later discard a subderivation.
    Marker(String),
    /// A term variable has the given type.
    Assump(String, Type),
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Note::UVar(name) => write!(f, "{}", name),
            Note::EVar(name) => write!(f, "{{{}}}", name),
            Note::Solved(name, ty) => write!(f, "{{{}}} = {}", name, ty),
            Note::Marker(name) => write!(f, "\u{25b6}{}", name),
            Note::Assump(name, ty) => write!(f, "{}: {}", name, ty),
        }
    }
}

/// An ordered sequence of [`Note`]s, newest at the front.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Context {
    notes: Vec<Note>,
}

impl Context {
    pub fn empty() -> Self {
        Context { notes: Vec::new() }
    }

    pub fn from_notes(notes: Vec<Note>) -> Self {
        Context { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Append `note` to the head (the newest position).
    pub fn pushed(&self, note: Note) -> Context {
        log::trace!("context: push {}", note);
        let mut notes = Vec::with_capacity(self.notes.len() + 1);
        notes.push(note);
        notes.extend(self.notes.iter().cloned());
        Context { notes }
    }

    /// Append `new_notes` (already newest-first) to the head.
    pub fn pushed_many(&self, new_notes: Vec<Note>) -> Context {
        let mut notes = new_notes;
        notes.extend(self.notes.iter().cloned());
        Context { notes }
    }

    fn position(&self, note: &Note) -> Option<usize> {
        self.notes.iter().position(|n| n == note)
    }

    pub fn contains(&self, note: &Note) -> bool {
        self.position(note).is_some()
    }

    fn contains_uvar(&self, name: &str) -> bool {
        self.notes.iter().any(|n| matches!(n, Note::UVar(v) if v == name))
    }

    fn contains_evar_or_solved(&self, name: &str) -> bool {
        self.notes.iter().any(|n| match n {
            Note::EVar(v) => v == name,
            Note::Solved(v, _) => v == name,
            _ => false,
        })
    }

    /// The unique `Assump(x, A)` in this context, if any.
    ///
    /// A term variable is assumed to have at most one binding in scope at
    /// a time; multiple matches indicate that invariant has been broken
    /// somewhere upstream, so this fails fast rather than silently picking
    /// one.
    pub fn assump(&self, x: &str) -> KernelResult<Option<Type>> {
        let mut found: Option<&Type> = None;
        for note in &self.notes {
            if let Note::Assump(name, ty) = note {
                if name == x {
                    if found.is_some() {
                        return Err(KernelError::InvariantViolation(format!(
                            "multiple assumptions for variable `{}`",
                            x
                        )));
                    }
                    found = Some(ty);
                }
            }
        }
        Ok(found.cloned())
    }

    /// The unique `Solved(alpha, tau)` in this context, if any.
    pub fn solution(&self, alpha: &str) -> KernelResult<Option<Type>> {
        let mut found: Option<&Type> = None;
        for note in &self.notes {
            if let Note::Solved(name, ty) = note {
                if name == alpha {
                    if found.is_some() {
                        return Err(KernelError::InvariantViolation(format!(
                            "multiple solutions for existential {{{}}}",
                            alpha
                        )));
                    }
                    found = Some(ty);
                }
            }
        }
        Ok(found.cloned())
    }

    /// The suffix of this context strictly older than `note`; empty if
    /// `note` is absent.
    pub fn peel(&self, note: &Note) -> Context {
        match self.position(note) {
            Some(idx) => Context::from_notes(self.notes[idx + 1..].to_vec()),
            None => Context::empty(),
        }
    }

    /// Splits the context at `note`, returning `(post, pre)` where `post`
    /// holds everything newer (newest-first) and `pre` everything older.
    /// `note` itself is excluded from both. Fails hard if `note` is absent.
    pub fn split(&self, note: &Note) -> KernelResult<(Vec<Note>, Vec<Note>)> {
        match self.position(note) {
            Some(idx) => {
                let post = self.notes[..idx].to_vec();
                let pre = self.notes[idx + 1..].to_vec();
                Ok((post, pre))
            }
            None => Err(KernelError::InvariantViolation(format!(
                "split: note {} not found in context",
                note
            ))),
        }
    }

    /// Splits at `note` and replaces it in place with `replacement`
    /// (already newest-first), returning `post ++ replacement ++ pre`.
    pub fn replace_at(&self, note: &Note, replacement: Vec<Note>) -> KernelResult<Context> {
        let (post, pre) = self.split(note)?;
        let mut notes = post;
        notes.extend(replacement);
        notes.extend(pre);
        Ok(Context::from_notes(notes))
    }

    /// True iff `EVar(earlier)` occurs in the portion of this context
    /// strictly older than `EVar(later)` — i.e. `earlier` was declared
    /// before `later`.
    pub fn declared_before(&self, earlier: &str, later: &str) -> KernelResult<bool> {
        let (_, pre) = self.split(&Note::EVar(later.to_string()))?;
        Ok(pre.iter().any(|n| matches!(n, Note::EVar(v) if v == earlier)))
    }

    /// True iff every `UVar` in `ty` has a matching note here, and every
    /// `EVar` has either an unsolved or a solved note.
    pub fn well_formed(&self, ty: &Type) -> bool {
        match ty {
            Type::Unit => true,
            Type::UVar(name) => self.contains_uvar(name),
            Type::EVar(name) => self.contains_evar_or_solved(name),
            Type::Forall(name, body) => self.pushed(Note::UVar(name.clone())).well_formed(body),
            Type::Fun(domain, codomain) => self.well_formed(domain) && self.well_formed(codomain),
        }
    }

    /// Replace every solved existential in `ty` by its solution, recursively
    /// until a fixed point. `Forall` and `Fun` are traversed; other cases
    /// are identity (aside from resolving a solved `EVar`).
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Unit | Type::UVar(_) => ty.clone(),
            Type::EVar(name) => match self.solution(name) {
                Ok(Some(solved)) => self.apply(&solved),
                _ => ty.clone(),
            },
            Type::Forall(name, body) => Type::Forall(name.clone(), Box::new(self.apply(body))),
            Type::Fun(domain, codomain) => {
                Type::Fun(Box::new(self.apply(domain)), Box::new(self.apply(codomain)))
            }
        }
    }

    /// Apply this context's solutions to every type slot in `term`.
    pub fn apply_expr(&self, term: &Term) -> Term {
        match term {
            Term::Unit => Term::Unit,
            Term::Var(name, slot) => Term::Var(name.clone(), self.apply_slot(slot)),
            Term::Abs(arg, slot, body) => {
                Term::Abs(arg.clone(), self.apply_slot(slot), Box::new(self.apply_expr(body)))
            }
            Term::App(func, arg, slot) => Term::App(
                Box::new(self.apply_expr(func)),
                Box::new(self.apply_expr(arg)),
                self.apply_slot(slot),
            ),
            Term::Ann(body, ty) => Term::Ann(Box::new(self.apply_expr(body)), self.apply(ty)),
            Term::Let(name, bound, body) => Term::Let(
                name.clone(),
                Box::new(self.apply_expr(bound)),
                Box::new(self.apply_expr(body)),
            ),
        }
    }

    fn apply_slot(&self, slot: &TypeSlot) -> TypeSlot {
        match slot.get() {
            Some(ty) => TypeSlot::Set(self.apply(ty)),
            None => TypeSlot::Unset,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, note) in self.notes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", note)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(notes: Vec<Note>) -> Context {
        Context::from_notes(notes)
    }

    /// Context `[UVar(b), UVar(a), EVar(c)]` (newest first); peeling past
    /// `UVar(a)` should leave only `[EVar(c)]`.
    #[test]
    fn peel_test() {
        let c = ctx(vec![
            Note::UVar("b".into()),
            Note::UVar("a".into()),
            Note::EVar("c".into()),
        ]);
        let peeled = c.peel(&Note::UVar("a".into()));
        assert_eq!(peeled, ctx(vec![Note::EVar("c".into())]));
    }

    #[test]
    fn peel_on_absent_note_is_empty() {
        let c = ctx(vec![Note::UVar("a".into())]);
        let peeled = c.peel(&Note::UVar("z".into()));
        assert_eq!(peeled, Context::empty());
    }

    #[test]
    fn split_on_absent_note_errors() {
        let c = ctx(vec![Note::UVar("a".into())]);
        assert!(c.split(&Note::UVar("z".into())).is_err());
    }

    #[test]
    fn split_separates_newer_and_older() {
        let c = ctx(vec![
            Note::UVar("b".into()),
            Note::Marker("m".into()),
            Note::UVar("a".into()),
        ]);
        let (post, pre) = c.split(&Note::Marker("m".into())).unwrap();
        assert_eq!(post, vec![Note::UVar("b".into())]);
        assert_eq!(pre, vec![Note::UVar("a".into())]);
    }

    #[test]
    fn assump_finds_unique_match() {
        let c = ctx(vec![Note::Assump("x".into(), Type::Unit)]);
        assert_eq!(c.assump("x").unwrap(), Some(Type::Unit));
        assert_eq!(c.assump("y").unwrap(), None);
    }

    #[test]
    fn assump_fails_fast_on_duplicates() {
        let c = ctx(vec![
            Note::Assump("x".into(), Type::Unit),
            Note::Assump("x".into(), Type::Unit),
        ]);
        assert!(c.assump("x").is_err());
    }

    #[test]
    fn well_formed_checks_uvar_and_evar() {
        let c = ctx(vec![Note::UVar("a".into()), Note::EVar("e".into())]);
        assert!(c.well_formed(&Type::UVar("a".into())));
        assert!(c.well_formed(&Type::EVar("e".into())));
        assert!(!c.well_formed(&Type::UVar("b".into())));
    }

    #[test]
    fn well_formed_checks_both_sides_of_fun() {
        let c = ctx(vec![Note::UVar("a".into())]);
        let ty = Type::fun(Type::UVar("a".into()), Type::UVar("b".into()));
        assert!(!c.well_formed(&ty));
        let ty2 = Type::fun(Type::UVar("b".into()), Type::UVar("a".into()));
        assert!(!c.well_formed(&ty2));
    }

    #[test]
    fn apply_resolves_solved_existential_to_fixed_point() {
        let c = ctx(vec![
            Note::Solved("e2".into(), Type::Unit),
            Note::Solved("e1".into(), Type::EVar("e2".into())),
        ]);
        assert_eq!(c.apply(&Type::EVar("e1".into())), Type::Unit);
    }

    #[test]
    fn apply_is_idempotent() {
        let c = ctx(vec![Note::Solved("e1".into(), Type::Unit)]);
        let once = c.apply(&Type::EVar("e1".into()));
        let twice = c.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn declared_before_checks_relative_age() {
        let c = ctx(vec![Note::EVar("b".into()), Note::EVar("a".into())]);
        assert!(c.declared_before("a", "b").unwrap());
        assert!(!c.declared_before("b", "a").unwrap());
    }

    #[test]
    fn replace_at_substitutes_in_place() {
        let c = ctx(vec![Note::EVar("a".into()), Note::UVar("x".into())]);
        let replaced = c
            .replace_at(&Note::EVar("a".into()), vec![Note::Solved("a".into(), Type::Unit)])
            .unwrap();
        assert_eq!(
            replaced,
            ctx(vec![Note::Solved("a".into(), Type::Unit), Note::UVar("x".into())])
        );
    }
}
