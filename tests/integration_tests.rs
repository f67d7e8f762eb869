//! Integration tests for token-ledger

use bigdecimal::BigDecimal;
use std::sync::Arc;
use token_ledger::{
    Address, Amount, DefaultTransferValidator, EventKind, LedgerError, LedgerResult,
    MemoryEventSink, Token, TokenConfig, TokenMetadata, TracingEventSink, TransferValidator,
};

const SUPPLY: u128 = 10_000_000_000_000_000_000_000;

fn owner() -> Address {
    Address::from_low_u8(0x01)
}

fn addr1() -> Address {
    Address::from_low_u8(0x02)
}

fn addr2() -> Address {
    Address::from_low_u8(0x03)
}

fn addr3() -> Address {
    Address::from_low_u8(0x04)
}

fn deploy() -> (Token, MemoryEventSink) {
    let sink = MemoryEventSink::new();
    let config = TokenConfig::new(owner());
    let token = Token::from_config(&config, Arc::new(sink.clone())).unwrap();
    sink.clear();
    (token, sink)
}

fn amount(value: i64) -> BigDecimal {
    BigDecimal::from(value)
}

fn sum_of_balances(token: &Token, accounts: &[Address]) -> u128 {
    accounts.iter().map(|a| token.balance_of(a).units()).sum()
}

#[test]
fn test_metadata() {
    let (token, _) = deploy();

    assert_eq!(token.name(), "Volcano Coin");
    assert_eq!(token.symbol(), "VLC");
    assert_eq!(token.decimals(), 18);
}

#[test]
fn test_initial_supply_assigned_to_deployer() {
    let (token, _) = deploy();

    assert_eq!(token.total_supply(), Amount::new(SUPPLY));
    assert_eq!(token.balance_of(&owner()), token.total_supply());
    assert_eq!(token.balance_of(&addr1()), Amount::ZERO);
    assert_eq!(token.balance_of(&Address::ZERO), Amount::ZERO);
}

#[test]
fn test_transfer_updates_balances() {
    let (token, sink) = deploy();
    let before = token.balance_of(&owner());

    assert!(token.transfer(&owner(), &addr1(), &amount(100)).unwrap());

    assert_eq!(
        token.balance_of(&owner()),
        before.checked_sub(Amount::new(100)).unwrap()
    );
    assert_eq!(token.balance_of(&addr1()), Amount::new(100));
    assert_eq!(token.total_supply(), Amount::new(SUPPLY));
    assert_eq!(
        sink.kinds(),
        vec![EventKind::Transfer {
            from: owner(),
            to: addr1(),
            amount: Amount::new(100),
        }]
    );
}

#[test]
fn test_transfer_exceeding_balance_fails() {
    let (token, sink) = deploy();
    token.transfer(&owner(), &addr1(), &amount(100)).unwrap();
    sink.clear();

    let err = token
        .transfer(&addr1(), &addr2(), &amount(150))
        .unwrap_err();

    assert_eq!(
        err,
        LedgerError::InsufficientBalance {
            account: addr1(),
            available: Amount::new(100),
            requested: Amount::new(150),
        }
    );
    assert_eq!(token.balance_of(&addr1()), Amount::new(100));
    assert_eq!(token.balance_of(&addr2()), Amount::ZERO);
    assert!(sink.is_empty());
}

#[test]
fn test_transfer_to_zero_address_fails() {
    let (token, _) = deploy();

    let err = token
        .transfer(&owner(), &Address::ZERO, &amount(10))
        .unwrap_err();
    assert_eq!(err, LedgerError::InvalidRecipient);
    assert_eq!(err.to_string(), "Invalid recipient: transfer to the zero address");

    // Regardless of the sender's balance
    let err = token
        .transfer(&addr3(), &Address::ZERO, &amount(10))
        .unwrap_err();
    assert_eq!(err, LedgerError::InvalidRecipient);
    assert_eq!(token.balance_of(&owner()), Amount::new(SUPPLY));
}

#[test]
fn test_approve_sets_allowance() {
    let (token, _) = deploy();
    let before = token.allowance(&owner(), &addr1());

    token.approve(&owner(), &addr1(), &amount(10)).unwrap();

    assert_eq!(
        token.allowance(&owner(), &addr1()),
        before.checked_add(Amount::new(10)).unwrap()
    );
}

#[test]
fn test_approve_overwrites_allowance() {
    let (token, _) = deploy();

    token.approve(&owner(), &addr1(), &amount(10)).unwrap();
    assert_eq!(token.allowance(&owner(), &addr1()), Amount::new(10));

    token.approve(&owner(), &addr1(), &amount(0)).unwrap();
    token.approve(&owner(), &addr1(), &amount(5)).unwrap();
    assert_eq!(token.allowance(&owner(), &addr1()), Amount::new(5));
}

#[test]
fn test_repeated_approve_does_not_accumulate() {
    let (token, _) = deploy();

    token.approve(&owner(), &addr1(), &amount(10)).unwrap();
    token.approve(&owner(), &addr1(), &amount(10)).unwrap();

    assert_eq!(token.allowance(&owner(), &addr1()), Amount::new(10));
}

#[test]
fn test_approve_emits_approval_event() {
    let (token, sink) = deploy();

    token.approve(&owner(), &addr1(), &amount(10)).unwrap();

    let event = sink.last().unwrap();
    assert_eq!(
        event.kind,
        EventKind::Approval {
            owner: owner(),
            spender: addr1(),
            amount: Amount::new(10),
        }
    );
}

#[test]
fn test_approve_negative_amount_fails() {
    let (token, sink) = deploy();

    let err = token
        .approve(&owner(), &addr1(), &amount(-10))
        .unwrap_err();

    assert!(matches!(err, LedgerError::InvalidAmount(_)));
    assert_eq!(token.allowance(&owner(), &addr1()), Amount::ZERO);
    assert!(sink.is_empty());
}

#[test]
fn test_transfer_from_without_allowance_fails() {
    let (token, _) = deploy();

    let err = token
        .transfer_from(&owner(), &addr1(), &addr2(), &amount(10))
        .unwrap_err();

    assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));
    assert_eq!(err.to_string().split(':').next(), Some("Insufficient allowance"));
}

#[test]
fn test_transfer_from_with_allowance() {
    let (token, sink) = deploy();
    token.transfer(&owner(), &addr1(), &amount(20)).unwrap();

    // addr1 must approve owner before owner can move addr1's tokens
    token.approve(&addr1(), &owner(), &amount(10)).unwrap();
    token
        .transfer_from(&owner(), &addr1(), &addr2(), &amount(10))
        .unwrap();

    assert_eq!(token.balance_of(&addr1()), Amount::new(10));
    assert_eq!(token.balance_of(&addr2()), Amount::new(10));
    assert_eq!(token.allowance(&addr1(), &owner()), Amount::ZERO);
    assert_eq!(
        sink.last().map(|e| e.kind),
        Some(EventKind::Transfer {
            from: addr1(),
            to: addr2(),
            amount: Amount::new(10),
        })
    );
}

#[test]
fn test_transfer_from_to_zero_address_fails() {
    let (token, _) = deploy();
    token.approve(&owner(), &addr1(), &amount(50)).unwrap();

    let err = token
        .transfer_from(&addr1(), &owner(), &Address::ZERO, &amount(10))
        .unwrap_err();

    assert_eq!(err, LedgerError::InvalidRecipient);
    assert_eq!(token.allowance(&owner(), &addr1()), Amount::new(50));
}

#[test]
fn test_transfer_from_is_atomic_when_balance_is_short() {
    let (token, sink) = deploy();
    token.transfer(&owner(), &addr1(), &amount(5)).unwrap();
    token.approve(&addr1(), &addr2(), &amount(100)).unwrap();
    sink.clear();
    let before = token.snapshot();

    let err = token
        .transfer_from(&addr2(), &addr1(), &addr3(), &amount(50))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientBalance { .. }));

    let after = token.snapshot();
    assert_eq!(after.balances, before.balances);
    assert_eq!(after.allowances, before.allowances);
    assert!(sink.is_empty());
}

#[test]
fn test_fractional_amount_fails() {
    let (token, _) = deploy();
    let half: BigDecimal = "0.5".parse().unwrap();

    assert!(matches!(
        token.transfer(&owner(), &addr1(), &half),
        Err(LedgerError::InvalidAmount(_))
    ));
}

#[test]
fn test_oversized_exponent_is_rejected_quickly() {
    let (token, sink) = deploy();
    let before = token.snapshot();

    let started = std::time::Instant::now();
    for raw in ["1e2000000", "1e-2000000", "123456789e900000"] {
        let huge: BigDecimal = raw.parse().unwrap();
        assert!(matches!(
            token.transfer(&owner(), &addr1(), &huge),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            token.approve(&owner(), &addr1(), &huge),
            Err(LedgerError::InvalidAmount(_))
        ));
    }
    assert!(started.elapsed() < std::time::Duration::from_secs(1));

    let after = token.snapshot();
    assert_eq!(after.balances, before.balances);
    assert_eq!(after.allowances, before.allowances);
    assert!(sink.is_empty());
}

#[test]
fn test_increase_and_decrease_allowance() {
    let (token, sink) = deploy();

    token
        .increase_allowance(&owner(), &addr1(), &amount(10))
        .unwrap();
    token
        .increase_allowance(&owner(), &addr1(), &amount(5))
        .unwrap();
    assert_eq!(token.allowance(&owner(), &addr1()), Amount::new(15));

    token
        .decrease_allowance(&owner(), &addr1(), &amount(12))
        .unwrap();
    assert_eq!(token.allowance(&owner(), &addr1()), Amount::new(3));
    assert_eq!(
        sink.last().map(|e| e.kind),
        Some(EventKind::Approval {
            owner: owner(),
            spender: addr1(),
            amount: Amount::new(3),
        })
    );

    let err = token
        .decrease_allowance(&owner(), &addr1(), &amount(10))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));
    assert_eq!(token.allowance(&owner(), &addr1()), Amount::new(3));
}

#[test]
fn test_conservation_across_mixed_operations() {
    let (token, _) = deploy();
    let accounts = [owner(), addr1(), addr2(), addr3()];

    token.transfer(&owner(), &addr1(), &amount(1_000)).unwrap();
    token.approve(&addr1(), &addr2(), &amount(600)).unwrap();
    token
        .transfer_from(&addr2(), &addr1(), &addr3(), &amount(400))
        .unwrap();
    let _ = token.transfer(&addr3(), &addr2(), &amount(500));
    token.transfer(&addr3(), &addr2(), &amount(150)).unwrap();

    assert_eq!(sum_of_balances(&token, &accounts), SUPPLY);
    assert!(token.validate_integrity().is_valid);
    assert_eq!(token.holders().len(), 4);
}

struct DenyListValidator {
    denied: Vec<Address>,
}

impl TransferValidator for DenyListValidator {
    fn validate_recipient(&self, recipient: &Address) -> LedgerResult<()> {
        DefaultTransferValidator.validate_recipient(recipient)?;
        if self.denied.contains(recipient) {
            return Err(LedgerError::InvalidRecipient);
        }
        Ok(())
    }

    fn validate_amount(&self, amount: &BigDecimal) -> LedgerResult<Amount> {
        DefaultTransferValidator.validate_amount(amount)
    }
}

#[test]
fn test_custom_validator() {
    let (token, _) = deploy();
    let token = token.with_validator(Box::new(DenyListValidator {
        denied: vec![addr3()],
    }));

    assert!(token.transfer(&owner(), &addr1(), &amount(10)).is_ok());
    assert_eq!(
        token.transfer(&owner(), &addr3(), &amount(10)),
        Err(LedgerError::InvalidRecipient)
    );
}

#[test]
fn test_token_from_toml_config() {
    let config = TokenConfig::from_toml_str(
        r#"
name = "Ember"
symbol = "EMB"
decimals = 2
initial_supply = 1000000
initial_holder = "0x00000000000000000000000000000000000000ee"
"#,
    )
    .unwrap();
    let token = Token::from_config(&config, Arc::new(TracingEventSink)).unwrap();

    assert_eq!(
        token.metadata(),
        &TokenMetadata {
            name: "Ember".to_string(),
            symbol: "EMB".to_string(),
            decimals: 2,
        }
    );
    assert_eq!(
        token.balance_of(&Address::from_low_u8(0xee)),
        Amount::new(1_000_000)
    );
}

#[test]
fn test_tracing_sink_logs_events() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("token_ledger=debug")
        .with_test_writer()
        .try_init();

    let token = Token::from_config(&TokenConfig::new(owner()), Arc::new(TracingEventSink)).unwrap();
    token.approve(&owner(), &addr1(), &amount(7)).unwrap();
    token
        .transfer_from(&addr1(), &owner(), &addr2(), &amount(7))
        .unwrap();

    assert_eq!(token.balance_of(&addr2()), Amount::new(7));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transfers_conserve_supply() {
    let sink = MemoryEventSink::new();
    let token = Arc::new(
        Token::new(
            TokenMetadata::default(),
            owner(),
            Amount::new(10_000),
            Arc::new(sink.clone()),
        )
        .unwrap(),
    );

    // Seed every account so transfers can flow in all directions
    for account in [addr1(), addr2(), addr3()] {
        token.transfer(&owner(), &account, &amount(2_000)).unwrap();
    }

    let accounts = [owner(), addr1(), addr2(), addr3()];
    let mut handles = Vec::new();
    for worker in 0..8usize {
        let token = Arc::clone(&token);
        handles.push(tokio::spawn(async move {
            let mut committed = 0usize;
            for step in 0..200usize {
                let from = accounts[(worker + step) % accounts.len()];
                let to = accounts[(worker + step + 1) % accounts.len()];
                if token.transfer(&from, &to, &amount(7)).is_ok() {
                    committed += 1;
                }
            }
            committed
        }));
    }

    let mut committed = 0;
    for handle in handles {
        committed += handle.await.unwrap();
    }

    assert_eq!(sum_of_balances(&token, &accounts), 10_000);
    assert!(token.validate_integrity().is_valid);
    // Issuance, three seed transfers, then one event per committed transfer
    assert_eq!(sink.len(), 1 + 3 + committed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_spenders_never_overdraw_allowance() {
    let token = Arc::new(
        Token::new(
            TokenMetadata::default(),
            owner(),
            Amount::new(1_000),
            Arc::new(MemoryEventSink::new()),
        )
        .unwrap(),
    );
    token.approve(&owner(), &addr1(), &amount(100)).unwrap();
    token.approve(&owner(), &addr2(), &amount(100)).unwrap();

    let mut handles = Vec::new();
    for spender in [addr1(), addr2()] {
        for _ in 0..4 {
            let token = Arc::clone(&token);
            handles.push(tokio::spawn(async move {
                let mut moved = 0u128;
                for _ in 0..50 {
                    if token
                        .transfer_from(&spender, &owner(), &addr3(), &amount(3))
                        .is_ok()
                    {
                        moved += 3;
                    }
                }
                moved
            }));
        }
    }

    let mut moved = 0;
    for handle in handles {
        moved += handle.await.unwrap();
    }

    // Each spender can move at most 99 of its 100 in steps of 3
    assert_eq!(moved, 198);
    assert_eq!(token.balance_of(&addr3()), Amount::new(198));
    assert_eq!(token.allowance(&owner(), &addr1()), Amount::new(1));
    assert_eq!(token.allowance(&owner(), &addr2()), Amount::new(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_events_arrive_in_commit_order() {
    let sink = MemoryEventSink::new();
    let token = Arc::new(
        Token::new(
            TokenMetadata::default(),
            owner(),
            Amount::new(10_000),
            Arc::new(sink.clone()),
        )
        .unwrap(),
    );
    sink.clear();

    let mut handles = Vec::new();
    for worker in 0..8i64 {
        let token = Arc::clone(&token);
        handles.push(tokio::spawn(async move {
            for step in 0..100i64 {
                token
                    .approve(&owner(), &addr1(), &amount(worker * 1_000 + step))
                    .unwrap();
                if step % 10 == 0 {
                    token.transfer(&owner(), &addr2(), &amount(1)).unwrap();
                    token.transfer(&addr2(), &addr3(), &amount(1)).unwrap();
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // The last approval delivered is the one that stuck
    let last_approval = sink
        .kinds()
        .into_iter()
        .rev()
        .find_map(|kind| match kind {
            EventKind::Approval { amount, .. } => Some(amount),
            _ => None,
        })
        .unwrap();
    assert_eq!(last_approval, token.allowance(&owner(), &addr1()));

    // Replaying transfers in delivery order never overdraws addr2
    let mut relay = 0u128;
    for kind in sink.kinds() {
        if let EventKind::Transfer { from, to, amount } = kind {
            if to == addr2() {
                relay += amount.units();
            }
            if from == addr2() {
                relay = relay
                    .checked_sub(amount.units())
                    .expect("transfer out of addr2 delivered before the transfer in");
            }
        }
    }
    assert_eq!(relay, 0);
    assert_eq!(token.balance_of(&addr3()), Amount::new(80));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_always_see_full_supply() {
    use std::sync::atomic::{AtomicBool, Ordering};

    let token = Arc::new(
        Token::new(
            TokenMetadata::default(),
            owner(),
            Amount::new(10_000),
            Arc::new(MemoryEventSink::new()),
        )
        .unwrap(),
    );
    for account in [addr1(), addr2(), addr3()] {
        token.transfer(&owner(), &account, &amount(2_000)).unwrap();
    }

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let token = Arc::clone(&token);
        let done = Arc::clone(&done);
        tokio::spawn(async move {
            let mut reads = 0usize;
            while !done.load(Ordering::Acquire) || reads == 0 {
                let snapshot = token.snapshot();
                let sum: u128 = snapshot.balances.values().map(|b| b.units()).sum();
                assert_eq!(sum, snapshot.total_supply.units());
                assert_eq!(sum, 10_000);
                reads += 1;
                tokio::task::yield_now().await;
            }
            reads
        })
    };

    let accounts = [owner(), addr1(), addr2(), addr3()];
    let mut writers = Vec::new();
    for worker in 0..6usize {
        let token = Arc::clone(&token);
        writers.push(tokio::spawn(async move {
            for step in 0..300usize {
                let from = accounts[(worker + step) % accounts.len()];
                let to = accounts[(worker * 3 + step + 1) % accounts.len()];
                let _ = token.transfer(&from, &to, &amount(13));
                if step % 50 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        }));
    }
    for writer in writers {
        writer.await.unwrap();
    }
    done.store(true, Ordering::Release);

    assert!(reader.await.unwrap() > 0);
    assert!(token.validate_integrity().is_valid);
}
