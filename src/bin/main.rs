#![forbid(unsafe_code)]
//! Demonstration driver: scripts a fixed sequence of wallet transfers and
//! verifies the finished chain.

use minichain::blockchain::{Block, Blockchain};
use minichain::config::load_config;
use minichain::crypto::KeyPair;
use minichain::error::ChainError;
use minichain::wallet::Wallet;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = load_config()?;
    println!(
        "Ledger configuration: difficulty = {}, minimum transaction = {}",
        config.difficulty, config.minimum_transaction
    );

    let coinbase = KeyPair::generate()?;
    let mut wallet_one = Wallet::new()?;
    let mut wallet_two = Wallet::new()?;

    let mut chain = Blockchain::new(config);

    println!("\nCreating and mining genesis block (100 coins to wallet one)...");
    chain.create_genesis(&coinbase, &wallet_one.public_key(), 100)?;

    println!("\nwallet one's balance is: {}", wallet_one.balance(&chain.state));
    println!("wallet one is attempting to send 65 coins to wallet two");
    let mut block1 = Block::new(chain.latest_hash());
    transfer(&mut block1, &mut wallet_one, &wallet_two.public_key(), 65, &mut chain);
    chain.mine_and_append(block1)?;
    print_balances(&mut wallet_one, &mut wallet_two, &chain);

    println!("\nwallet one is attempting to send 1000 coins, more than it has");
    let mut block2 = Block::new(chain.latest_hash());
    transfer(&mut block2, &mut wallet_one, &wallet_two.public_key(), 1000, &mut chain);
    chain.mine_and_append(block2)?;
    print_balances(&mut wallet_one, &mut wallet_two, &chain);

    println!("\nwallet two is attempting to send 10 coins to wallet one");
    let mut block3 = Block::new(chain.latest_hash());
    transfer(&mut block3, &mut wallet_two, &wallet_one.public_key(), 10, &mut chain);
    chain.mine_and_append(block3)?;
    print_balances(&mut wallet_one, &mut wallet_two, &chain);

    match chain.validate() {
        Ok(()) => println!("\nBlockchain is valid."),
        Err(e) => println!("\nBlockchain is NOT valid: {}", e),
    }

    println!("\nFull chain dump:");
    println!("{}", serde_json::to_string_pretty(&chain.blocks)?);

    Ok(())
}

/// Moves `value` coins from `sender` into `block`, reporting rather than
/// aborting when the wallet or the engine refuses the transfer.
fn transfer(
    block: &mut Block,
    sender: &mut Wallet,
    recipient: &secp256k1::PublicKey,
    value: u64,
    chain: &mut Blockchain,
) {
    match sender.send_funds(recipient, value, &chain.state) {
        Ok(tx) => {
            if let Err(e) = block.add_transaction(tx, &mut chain.state, &chain.config) {
                println!("Transaction failed to process, discarded: {}", e);
            } else {
                println!("Transaction successfully added to block");
            }
        }
        Err(ChainError::InsufficientFunds(msg)) => {
            println!("Insufficient funds, transaction aborted: {}", msg);
        }
        Err(e) => println!("Transfer refused: {}", e),
    }
}

fn print_balances(wallet_one: &mut Wallet, wallet_two: &mut Wallet, chain: &Blockchain) {
    println!("wallet one's balance is: {}", wallet_one.balance(&chain.state));
    println!("wallet two's balance is: {}", wallet_two.balance(&chain.state));
}
