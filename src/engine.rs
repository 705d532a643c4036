/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The seam to the execution engine, which interprets messages against a state view.
//!
//! An engine is built by an [EngineFactory] for exactly one message and consumed by
//! [ExecutionEngine::apply_message]. Since it borrows the state view for its whole lifetime and cannot outlive
//! the call that applies the message, no engine state can leak from one transaction into the next.
//!
//! Faults inside the engine itself (broken invariants, resource exhaustion) are not part of this contract:
//! an engine raises them by panicking.

use crate::{
    config::{ChainConfig, ExecutionConfig},
    context::ExecutionContext,
    error::InvalidTransaction,
    state::StateView,
    types::{ExecutionResult, Message},
};

/// A single-use execution engine bound to a state view.
pub trait ExecutionEngine {
    /// Apply the message. A reverted execution is `Ok` with [ExitStatus::Reverted](crate::types::ExitStatus::Reverted);
    /// `Err` means the message was refused before it could execute.
    fn apply_message(self, msg: Message) -> Result<ExecutionResult, InvalidTransaction>;
}

/// Builds a fresh [ExecutionEngine] per transaction.
pub trait EngineFactory {
    type Engine<'a>: ExecutionEngine
    where
        Self: 'a;

    fn new_engine<'a>(
        &'a self,
        context: ExecutionContext<'a>,
        state: &'a mut dyn StateView,
        config: &'a ChainConfig,
        cfg: &'a ExecutionConfig,
    ) -> Self::Engine<'a>;
}
