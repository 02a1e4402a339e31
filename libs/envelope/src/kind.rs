//! Resource kind descriptors.

use std::fmt;

/// The envelope keys for one resource type.
///
/// The singular key wraps a single resource (`{"network": {...}}`); the
/// plural key wraps list and bulk bodies (`{"networks": [...]}`). Both keys
/// are declared explicitly, never derived, so irregular plurals and
/// API-specific spellings cost nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceKind {
    singular: &'static str,
    plural: &'static str,
}

impl ResourceKind {
    /// Creates a kind from its two envelope keys.
    #[must_use]
    pub const fn new(singular: &'static str, plural: &'static str) -> Self {
        Self { singular, plural }
    }

    /// The key wrapping a single resource body.
    #[must_use]
    pub const fn singular(&self) -> &'static str {
        self.singular
    }

    /// The key wrapping list and bulk bodies.
    #[must_use]
    pub const fn plural(&self) -> &'static str {
        self.plural
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular)
    }
}
