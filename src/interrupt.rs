/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Cancellation signal shared between a supervisor and a prefetch pass.
//!
//! The flag only ever moves from "running" to "interrupted". A pass checks it before every
//! transaction and never blocks on it.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Interrupt is a one-way flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// Create a fresh flag which is not yet requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the pass to stop. Idempotent.
    pub fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Check if stopping was requested.
    #[inline]
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
