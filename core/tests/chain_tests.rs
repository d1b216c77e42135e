use obscura_core::chain::Chain;
use obscura_core::{Block, Keypair, Mempool, TxRecord};

const DIFFICULTY: usize = 1;

fn mine(mut block: Block) -> Block {
    Chain::proof_of_work(&mut block, DIFFICULTY);
    block
}

#[test]
fn genesis_block_is_stable_across_independent_chains() {
    let a = Chain::new();
    let b = Chain::new();
    assert_eq!(a.last_block(), b.last_block());
}

#[test]
fn a_chain_can_grow_by_several_blocks_and_stays_valid() {
    let chain = Chain::new();
    for _ in 0..3 {
        let tip = chain.last_block();
        let block = mine(Block::new(tip.index + 1, tip.hash, vec![]));
        assert!(chain.add_block(block, DIFFICULTY).is_ok());
    }
    assert_eq!(chain.len(), 4);
    assert!(Chain::is_valid_chain(&chain.get_chain_copy(), DIFFICULTY).is_ok());
}

#[test]
fn fork_resolution_prefers_longer_valid_chain_and_updates_balances() {
    let local = Chain::new();
    let miner = Keypair::generate();

    let tip = local.last_block();
    let reward = TxRecord::new_coinbase(miner.public_pem(), 10);
    let b1 = mine(Block::new(1, tip.hash, vec![reward]));
    assert!(local.add_block(b1.clone(), DIFFICULTY).is_ok());

    // A competing, longer fork starting from genesis wins even though the
    // local chain already has one block.
    let fork_b1 = mine(Block::new(1, Block::genesis().hash, vec![]));
    let fork_b2 = mine(Block::new(2, fork_b1.hash.clone(), vec![]));
    let fork = vec![Block::genesis(), fork_b1, fork_b2];

    assert!(local.replace_chain(fork.clone(), DIFFICULTY).is_ok());
    assert_eq!(local.get_chain_copy(), fork);
    // the miner's reward from the abandoned block no longer counts.
    assert_eq!(local.get_balance(&miner.public_pem(), 100), 100);
}

#[test]
fn mempool_transaction_gets_embedded_and_cleared_on_confirmation() {
    let chain = Chain::new();
    let sender = Keypair::generate();
    let mut mempool = Mempool::new();
    let tx = TxRecord::new_signed(&sender, "receiver".into(), 20, 1);

    chain.validate_for_mempool(&tx, &mempool, 100).expect("accepted");
    mempool.insert(tx.clone());

    let tip = chain.last_block();
    let picked = mempool.select_for_block(10);
    let block = mine(Block::new(tip.index + 1, tip.hash, picked));
    assert!(chain.add_block(block, DIFFICULTY).is_ok());
    mempool.remove(tx.tx_id().unwrap());

    assert!(mempool.is_empty());
    assert_eq!(chain.get_balance(&sender.public_pem(), 100), 79);
}
