//! Fresh-name generator for existential variables.
//!
//! A single monotonic counter, owned by one top-level `infer_expression`
//! invocation and threaded by `&mut` reference through every judgment. This
//! is the only mutable state in the core; everything else —
//! contexts, types, terms — is an immutable value tree.

/// Monotonic counter seeded by a human-readable prefix.
///
/// `fresh()` yields `format!("{prefix}{n}")` and increments `n`. Two calls
/// on the same `Generator` never return the same name.
#[derive(Debug, Clone)]
pub struct Generator {
    next: u64,
    prefix: String,
}

impl Generator {
    /// A generator whose first allocated name ends in `1`, using the
    /// default prefix `"t"`.
    pub fn new() -> Self {
        Generator::with_prefix("t")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Generator { next: 1, prefix: prefix.into() }
    }

    pub fn fresh(&mut self) -> String {
        let name = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        name
    }
}

impl Default for Generator {
    fn default() -> Self {
        Generator::new()
    }
}
