//! Readiness gate
//!
//! Nothing is sent into the runtime until it has announced that the engine
//! bundle finished loading. The transition happens once and never reverts.

use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadinessState {
    #[default]
    NotReady,
    Ready,
}

#[derive(Debug, Default)]
pub struct ReadinessGate {
    state: Cell<ReadinessState>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ReadinessState {
        self.state.get()
    }

    pub fn is_ready(&self) -> bool {
        self.state.get() == ReadinessState::Ready
    }

    /// Returns `true` only for the call that performed the transition.
    pub fn mark_ready(&self) -> bool {
        self.state.replace(ReadinessState::Ready) == ReadinessState::NotReady
    }
}
