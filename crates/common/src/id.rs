//! ID generation utilities.

use uuid::Uuid;

/// ID generator for entities and storage keys.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new row ID.
    ///
    /// UUID v7 is time-ordered, which keeps b-tree inserts local.
    #[must_use]
    pub fn generate(&self) -> Uuid {
        Uuid::now_v7()
    }

    /// Generate a random UUID v4, used where ordering must not leak.
    #[must_use]
    pub fn generate_random(&self) -> Uuid {
        Uuid::new_v4()
    }
}
