//! Handle generation for new secrets.
//!
//! Handles are drawn from the OS CSPRNG over the 62-symbol alphanumeric
//! alphabet. Ten characters give roughly 8.4e17 possibilities. Generation is
//! stateless; uniqueness is enforced at write time by the store's
//! insert-if-absent primitive, not here.

use std::fmt;

use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};

/// Source of fresh secret handles
pub trait HandleGenerator: Send + Sync + fmt::Debug {
    fn generate(&self) -> String;
}

/// Random alphanumeric handles of a fixed length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomHandleGenerator {
    length: usize,
}

impl RandomHandleGenerator {
    pub const DEFAULT_LENGTH: usize = 10;

    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomHandleGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LENGTH)
    }
}

impl HandleGenerator for RandomHandleGenerator {
    fn generate(&self) -> String {
        OsRng.sample_iter(&Alphanumeric).take(self.length).map(char::from).collect()
    }
}
