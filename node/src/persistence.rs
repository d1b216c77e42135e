//! On-disk chain snapshot: `<node_dir>/blockchain.json`, a pretty-printed
//! JSON array of block dicts. Plain synchronous `std::fs`
//! calls — the miner's dedicated OS thread calls these directly, async
//! call sites wrap them in `tokio::task::spawn_blocking`.

use std::fs;
use std::path::Path;

use obscura_core::chain::Chain;
use obscura_core::Block;
use serde_json::Value;
use tracing::warn;

const CHAIN_FILE_NAME: &str = "blockchain.json";

/// Writes the full chain as a pretty JSON array of block dicts.
pub fn save_chain(dir: &Path, chain: &Chain) -> std::io::Result<()> {
    let blocks = chain.get_chain_copy();
    let values: Vec<Value> = blocks.iter().map(Block::to_value).collect();
    let file = fs::File::create(dir.join(CHAIN_FILE_NAME))?;
    serde_json::to_writer_pretty(file, &values)?;
    Ok(())
}

/// Reads and validates `<dir>/blockchain.json`. Returns `None` (logging a
/// warning) if the file is absent, unparseable, or fails chain validation —
/// the caller falls back to a fresh genesis-only chain.
pub fn load_chain(dir: &Path, difficulty: usize) -> Option<Chain> {
    let path = dir.join(CHAIN_FILE_NAME);
    if !path.exists() {
        return None;
    }
    let contents = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "could not read blockchain.json, starting from genesis");
            return None;
        }
    };
    let values: Vec<Value> = match serde_json::from_str(&contents) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "blockchain.json is not valid JSON, starting from genesis");
            return None;
        }
    };
    let blocks: Vec<Block> = match values.iter().map(Block::from_value).collect() {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "blockchain.json contains a malformed block, starting from genesis");
            return None;
        }
    };
    if let Err(e) = Chain::is_valid_chain(&blocks, difficulty) {
        warn!(error = %e, "blockchain.json failed chain validation, starting from genesis");
        return None;
    }
    Some(Chain::from_validated_blocks(blocks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let chain = Chain::new();
        save_chain(dir.path(), &chain).unwrap();

        let reloaded = load_chain(dir.path(), 1).expect("reloads");
        assert_eq!(reloaded.get_chain_copy(), chain.get_chain_copy());
    }

    #[test]
    fn missing_file_yields_none() {
        let dir = tempdir().unwrap();
        assert!(load_chain(dir.path(), 1).is_none());
    }

    #[test]
    fn corrupt_file_yields_none() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CHAIN_FILE_NAME), "not json").unwrap();
        assert!(load_chain(dir.path(), 1).is_none());
    }

    #[test]
    fn invalid_chain_contents_yield_none() {
        let dir = tempdir().unwrap();
        let bogus = serde_json::json!([{"index": 5, "timestamp": 0.0, "transactions": [], "prev_hash": "0", "nonce": 0, "hash": "ff"}]);
        fs::write(dir.path().join(CHAIN_FILE_NAME), bogus.to_string()).unwrap();
        assert!(load_chain(dir.path(), 1).is_none());
    }
}
