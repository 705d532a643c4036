/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Configuration consumed by prefetching: chain-wide rules and per-pass execution options.

/// Chain-wide parameters which decide how transactions are turned into messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Identifier of the chain, mixed into signing payloads once replay protection is active
    pub chain_id: u64,
    /// Height from which signatures must commit to `chain_id`. None if the upgrade is not scheduled.
    pub replay_protection_block: Option<u64>,
}

impl ChainConfig {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            replay_protection_block: None,
        }
    }

    /// schedule the replay protection upgrade at the given height.
    pub fn set_replay_protection_block(mut self, height: u64) -> Self {
        self.replay_protection_block = Some(height);
        self
    }

    /// check if replay protection applies to the block at `height`.
    pub fn is_replay_protected(&self, height: u64) -> bool {
        self.replay_protection_block
            .map_or(false, |activation| height >= activation)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Options handed to the execution engine unchanged. Prefetching itself never reads them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Enables the engine's debug mode (e.g. opcode tracing)
    pub debug: bool,
    /// Ask the engine to record internal calls
    pub trace_internal_calls: bool,
    /// Upper bound of linear memory an engine may allocate for a contract, in bytes
    pub memory_limit: Option<usize>,
}

impl ExecutionConfig {
    pub fn set_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn set_trace_internal_calls(mut self, trace: bool) -> Self {
        self.trace_internal_calls = trace;
        self
    }

    pub fn set_memory_limit(mut self, memory_limit: usize) -> Self {
        self.memory_limit = Some(memory_limit);
        self
    }
}
