use ed25519_dalek::SigningKey;
use pchain_prefetcher::{
    types::{sha256, Block, BlockHeader, Command, PublicAddress, Transaction},
    ChainConfig, Signer,
};

pub const MIN_BASE_FEE: u64 = 8;
pub const TEST_GAS_LIMIT: u64 = 100_000;
pub const INIT_BALANCE: u64 = 100_000_000;
pub const CHAIN_ID: u64 = 1;

// Origin Account.
pub const ORIGIN_SECRET_KEY_BASE64: &str = "W16XnCJuPYHIKq92aoInCstzSdiBVHXoYPsdM4D_xrk";
// Target Account.
pub const TARGET_PUBLIC_KEY_BASE64: &str = "WU-d7VzIVVgKiNM2CM_2j-BVY1JCjPFQBowsJKBt4aQ";

pub struct TestData {}

impl TestData {
    pub fn origin_key() -> SigningKey {
        let secret: [u8; 32] = base64url::decode(ORIGIN_SECRET_KEY_BASE64)
            .unwrap()
            .try_into()
            .unwrap();
        SigningKey::from_bytes(&secret)
    }

    pub fn get_origin_address() -> PublicAddress {
        Self::origin_key().verifying_key().to_bytes()
    }

    pub fn get_target_address() -> PublicAddress {
        base64url::decode(TARGET_PUBLIC_KEY_BASE64)
            .unwrap()
            .try_into()
            .unwrap()
    }

    /// another signing account, distinct for every seed
    pub fn account_key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    pub fn chain_config() -> ChainConfig {
        ChainConfig::new(CHAIN_ID)
    }

    pub fn transaction(key: &SigningKey, nonce: u64, commands: Vec<Command>) -> Transaction {
        let tx = Transaction {
            signer: key.verifying_key().to_bytes(),
            nonce,
            gas_limit: TEST_GAS_LIMIT,
            max_base_fee_per_gas: MIN_BASE_FEE,
            priority_fee_per_gas: 0,
            commands,
            hash: [0u8; 32],
            signature: [0u8; 64],
        };
        Signer::Base.sign(tx, key).unwrap()
    }

    /// a transaction whose signature does not verify
    pub fn badly_signed_transaction(key: &SigningKey, nonce: u64, commands: Vec<Command>) -> Transaction {
        let mut tx = Self::transaction(key, nonce, commands);
        tx.signature[0] ^= 0x01;
        tx.hash = sha256(tx.signature);
        tx
    }

    pub fn block_header(number: u64) -> BlockHeader {
        BlockHeader {
            number,
            prev_block_hash: [3u8; 32],
            timestamp: 1665370157,
            base_fee_per_gas: MIN_BASE_FEE,
            gas_limit: 100_000_000,
            proposer: [0u8; 32],
        }
    }

    pub fn block(transactions: Vec<Transaction>) -> Block {
        Block::new(Self::block_header(1), transactions)
    }
}
