//! Consensus and runtime configuration for **Obscura** core.
//!
//! [`Config`] centralises every constant that must agree across nodes
//! (difficulty, block size limit, mining reward, starting balance) plus the
//! timing constants that only affect a single node's own behaviour
//! (gossip/chain-pull timeouts, sync interval, miner poll interval). It is
//! constructed via the fluent [`ConfigBuilder`], so callers can override
//! only the fields they care about while keeping sensible defaults.
//!
//! ```
//! use obscura_core::config::Config;
//!
//! let cfg = Config::default();
//! assert_eq!(cfg.difficulty, 4);
//! assert_eq!(cfg.block_size_limit, 3);
//! ```

use std::time::Duration;

/// Runtime configuration shared across the crate.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of leading hex-zero nibbles a valid block hash must have.
    pub difficulty: usize,

    /// Maximum number of transactions per block, coinbase included.
    pub block_size_limit: usize,

    /// Coinbase subsidy paid to the miner, before fees.
    pub mining_reward: u64,

    /// Balance every public key starts with, credited implicitly.
    pub starting_balance: i64,

    /// Connect/write timeout for one-shot gossip sends (transaction/block).
    pub gossip_timeout: Duration,

    /// Connect/read timeout for `get_chain` / `chain` pulls.
    pub chain_pull_timeout: Duration,

    /// Base sleep between syncer rounds; jitter (`0..sync_jitter_max`) is
    /// added on top to decorrelate peers.
    pub sync_interval: Duration,

    /// Upper bound (exclusive) of the uniform jitter added to
    /// `sync_interval` between syncer rounds.
    pub sync_jitter_max: Duration,

    /// Sleep between the miner's mining attempts when the mempool is empty
    /// or the previous attempt lost a race.
    pub miner_poll_interval: Duration,

    /// Human-readable network name (e.g. "main", "test").
    pub network: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: 4,
            block_size_limit: 3,
            mining_reward: 10,
            starting_balance: 100,
            gossip_timeout: Duration::from_secs(2),
            chain_pull_timeout: Duration::from_secs(10),
            sync_interval: Duration::from_secs(3),
            sync_jitter_max: Duration::from_secs(2),
            miner_poll_interval: Duration::from_millis(200),
            network: "main".into(),
        }
    }
}

/// Fluent builder for [`Config`].
#[derive(Default)]
pub struct ConfigBuilder {
    inner: Config,
}

impl ConfigBuilder {
    /// Starts a new builder pre-populated with [`Config::default`].
    pub fn new() -> Self {
        Self { inner: Config::default() }
    }

    pub fn difficulty(mut self, diff: usize) -> Self {
        self.inner.difficulty = diff;
        self
    }

    pub fn block_size_limit(mut self, limit: usize) -> Self {
        self.inner.block_size_limit = limit;
        self
    }

    pub fn mining_reward(mut self, reward: u64) -> Self {
        self.inner.mining_reward = reward;
        self
    }

    pub fn starting_balance(mut self, balance: i64) -> Self {
        self.inner.starting_balance = balance;
        self
    }

    pub fn network<S: Into<String>>(mut self, name: S) -> Self {
        self.inner.network = name.into();
        self
    }

    /// Consumes the builder returning an immutable configuration value.
    pub fn finish(self) -> Config {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_fields() {
        let cfg = ConfigBuilder::new()
            .difficulty(6)
            .mining_reward(25)
            .network("test")
            .finish();
        assert_eq!(cfg.difficulty, 6);
        assert_eq!(cfg.mining_reward, 25);
        assert_eq!(cfg.network, "test");
        assert_eq!(cfg.block_size_limit, 3, "unset fields keep defaults");
    }
}
