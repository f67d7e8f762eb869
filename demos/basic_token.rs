//! Basic token usage example

use bigdecimal::BigDecimal;
use std::sync::Arc;
use token_ledger::{Address, Token, TokenConfig, TracingEventSink};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("token_ledger=info")
        .init();

    println!("🌋 Token Ledger - Basic Token Example\n");

    let owner: Address = "0x00000000000000000000000000000000000000a1".parse()?;
    let alice: Address = "0x00000000000000000000000000000000000000b2".parse()?;
    let bob: Address = "0x00000000000000000000000000000000000000c3".parse()?;

    // 1. Issue the token
    let config = TokenConfig::from_toml_str(&format!(
        "initial_supply = \"1000000\"\ninitial_holder = \"{owner}\""
    ))?;
    let token = Token::from_config(&config, Arc::new(TracingEventSink))?;
    println!(
        "📊 Issued {} {} ({} decimals) to {owner}\n",
        token.total_supply(),
        token.symbol(),
        token.decimals()
    );

    // 2. Direct transfer
    token.transfer(&owner, &alice, &BigDecimal::from(2_500))?;
    println!("  ✓ owner → alice: 2500");

    // 3. Delegated transfer
    token.approve(&alice, &bob, &BigDecimal::from(1_000))?;
    println!("  ✓ alice approved bob for 1000");
    token.transfer_from(&bob, &alice, &bob, &BigDecimal::from(400))?;
    println!(
        "  ✓ bob moved 400 from alice into bob's account, {} allowance left\n",
        token.allowance(&alice, &bob)
    );

    // 4. A rejected transfer changes nothing
    match token.transfer(&bob, &Address::ZERO, &BigDecimal::from(1)) {
        Ok(_) => println!("  ✗ transfer to the zero address unexpectedly succeeded"),
        Err(e) => println!("  ✓ rejected: {e}"),
    }

    println!("\n📋 Holders:");
    for (account, balance) in token.holders() {
        println!("  {account}: {balance}");
    }

    let report = token.validate_integrity();
    println!(
        "\n🔍 Integrity: {}",
        if report.is_valid { "balanced" } else { "BROKEN" }
    );

    println!("\n{}", serde_json::to_string_pretty(&token.snapshot())?);

    Ok(())
}
