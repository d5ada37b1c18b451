//! Symbolic variable handles
//!
//! A [`Variable`] identifies a quantity of a [`System`](crate::System):
//! an unknown integrated by the solver, a parameter, or an externally
//! driven input. Identity is structural: every handle carries a unique
//! id allocated at creation, and two handles compare equal only if they
//! refer to the same declaration. The name is carried for display and
//! error messages, never for identity.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque handle for a quantity declared on a [`System`](crate::System)
///
/// Handles are cheap to clone and are the only way to refer to a
/// variable: in the dynamics function, in input declarations, and in
/// solution queries. Handles from different systems never compare
/// equal, even when their names collide.
#[derive(Debug, Clone)]
pub struct Variable {
    id: u64,
    name: Arc<str>,
}

impl Variable {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(name),
        }
    }

    /// Display name of the variable
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
