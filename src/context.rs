/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines the environment a message is executed in: block metadata, transaction origin and
//! access to earlier blocks through a [ChainContext].

use crate::types::{BlockHeader, Message, PublicAddress, Sha256Hash};

/// Number of preceding blocks whose hashes are visible to a transaction.
pub const BLOCK_HASH_WINDOW: u64 = 256;

/// Access to historical chain data that execution may need.
pub trait ChainContext {
    /// Header of the canonical block at `number`, if known.
    fn header(&self, number: u64) -> Option<BlockHeader>;
}

impl<T: ChainContext + ?Sized> ChainContext for std::sync::Arc<T> {
    fn header(&self, number: u64) -> Option<BlockHeader> {
        (**self).header(number)
    }
}

/// ExecutionContext binds a message to the block it is executed in.
#[derive(Clone)]
pub struct ExecutionContext<'a> {
    /// Sender of the message
    pub origin: PublicAddress,
    /// Effective price per unit of gas
    pub gas_price: u64,
    pub block_number: u64,
    pub timestamp: u32,
    pub base_fee_per_gas: u64,
    pub block_gas_limit: u64,
    /// Receiver of fees: the author override if any, otherwise the proposer of the block
    pub proposer: PublicAddress,
    pub prev_block_hash: Sha256Hash,
    chain: &'a dyn ChainContext,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        msg: &Message,
        header: &BlockHeader,
        chain: &'a dyn ChainContext,
        author: Option<PublicAddress>,
    ) -> Self {
        let gas_price = msg.max_base_fee_per_gas.min(
            header
                .base_fee_per_gas
                .saturating_add(msg.priority_fee_per_gas),
        );
        Self {
            origin: msg.from,
            gas_price,
            block_number: header.number,
            timestamp: header.timestamp,
            base_fee_per_gas: header.base_fee_per_gas,
            block_gas_limit: header.gas_limit,
            proposer: author.unwrap_or(header.proposer),
            prev_block_hash: header.prev_block_hash,
            chain,
        }
    }

    /// Hash of an earlier block. None for the current or future blocks, and for blocks outside the window.
    pub fn block_hash(&self, number: u64) -> Option<Sha256Hash> {
        if number >= self.block_number || self.block_number - number > BLOCK_HASH_WINDOW {
            return None;
        }
        if number + 1 == self.block_number {
            return Some(self.prev_block_hash);
        }
        self.chain.header(number).map(|header| header.hash())
    }
}

impl std::fmt::Debug for ExecutionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("origin", &self.origin)
            .field("gas_price", &self.gas_price)
            .field("block_number", &self.block_number)
            .field("proposer", &self.proposer)
            .finish_non_exhaustive()
    }
}
