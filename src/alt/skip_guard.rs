//! The skip guard (spec.md §4.3): always ready, never blocks, never
//! registers. Used to build an ALT with a non-blocking default branch.

use crate::alt::guard::Guard;
use crate::alt::state::AlterRegistration;
use crate::primitives::ProcessId;

pub struct SkipGuard;

impl SkipGuard {
    pub fn new() -> Self {
        SkipGuard
    }
}

impl Default for SkipGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Guard for SkipGuard {
    fn enable(&self, _registration: AlterRegistration) -> bool {
        true
    }

    fn disable(&self, _alter: ProcessId) -> bool {
        true
    }
}
