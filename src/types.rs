//! Core types and data structures for the token ledger

use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Default token name
pub const DEFAULT_NAME: &str = "Volcano Coin";
/// Default token symbol
pub const DEFAULT_SYMBOL: &str = "VLC";
/// Default decimal precision
pub const DEFAULT_DECIMALS: u8 = 18;

/// Opaque 20-byte account identity.
///
/// Rendered as `0x`-prefixed lower-case hex. [`Address::ZERO`] is the null
/// identity: it never holds funds and can never receive a transfer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; Address::LEN]);

impl Address {
    /// Width of an address in bytes
    pub const LEN: usize = 20;

    /// The null identity
    pub const ZERO: Address = Address([0u8; Address::LEN]);

    /// Create an address from raw bytes
    pub const fn new(bytes: [u8; Address::LEN]) -> Self {
        Self(bytes)
    }

    /// Build an address whose last byte is `tag` and all others zero.
    ///
    /// Handy for fixtures and demos; `from_low_u8(0)` is the null identity.
    pub const fn from_low_u8(tag: u8) -> Self {
        let mut bytes = [0u8; Address::LEN];
        bytes[Address::LEN - 1] = tag;
        Self(bytes)
    }

    /// Raw bytes of the address
    pub fn as_bytes(&self) -> &[u8; Address::LEN] {
        &self.0
    }

    /// Whether this is the null identity
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let bytes = hex::decode(digits)
            .map_err(|e| LedgerError::InvalidAddress(format!("'{s}': {e}")))?;

        let bytes: [u8; Address::LEN] = bytes.try_into().map_err(|raw: Vec<u8>| {
            LedgerError::InvalidAddress(format!(
                "'{s}': expected {} bytes, got {}",
                Address::LEN,
                raw.len()
            ))
        })?;

        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Unsigned token quantity in the token's smallest unit.
///
/// Only checked arithmetic is exposed so every overflow surfaces as a value
/// the caller has to deal with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount(u128);

impl Amount {
    /// Zero quantity
    pub const ZERO: Amount = Amount(0);
    /// Largest representable quantity
    pub const MAX: Amount = Amount(u128::MAX);

    /// Create an amount from smallest units
    pub const fn new(units: u128) -> Self {
        Self(units)
    }

    /// Smallest units held by this amount
    pub const fn units(self) -> u128 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// `whole` tokens expressed in smallest units at the given precision
    pub fn from_whole(whole: u128, decimals: u8) -> Option<Amount> {
        10u128
            .checked_pow(u32::from(decimals))
            .and_then(|scale| whole.checked_mul(scale))
            .map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    /// Plain decimal digits only; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LedgerError::InvalidAmount(format!(
                "'{s}': expected decimal digits only"
            )));
        }

        digits
            .parse::<u128>()
            .map(Amount)
            .map_err(|e| LedgerError::InvalidAmount(format!("'{s}': {e}")))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Decimal string keeps full 128-bit precision in JSON and TOML alike.
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl de::Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount(u128::from(v)))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
                Ok(Amount(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                u128::try_from(v)
                    .map(Amount)
                    .map_err(|_| E::custom(format!("amount cannot be negative: {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Static token metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Human-readable token name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Number of decimal places of the smallest unit
    pub decimals: u8,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            decimals: DEFAULT_DECIMALS,
        }
    }
}

/// What happened in a committed ledger mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Funds moved between two accounts
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    /// An allowance was set to a new value
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
}

/// Notification delivered to an [`EventSink`](crate::traits::EventSink)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Unique identifier for the event
    pub id: Uuid,
    /// The mutation that was committed
    pub kind: EventKind,
    /// When the event was recorded
    pub recorded_at: NaiveDateTime,
}

impl LedgerEvent {
    /// Wrap a committed mutation in a new event
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            recorded_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Create a transfer event
    pub fn transfer(from: Address, to: Address, amount: Amount) -> Self {
        Self::new(EventKind::Transfer { from, to, amount })
    }

    /// Create an approval event
    pub fn approval(owner: Address, spender: Address, amount: Amount) -> Self {
        Self::new(EventKind::Approval {
            owner,
            spender,
            amount,
        })
    }
}

/// Errors that can occur in the token ledger
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid recipient: transfer to the zero address")]
    InvalidRecipient,
    #[error("Insufficient balance: {account} holds {available}, needs {requested}")]
    InsufficientBalance {
        account: Address,
        available: Amount,
        requested: Amount,
    },
    #[error("Insufficient allowance: {spender} may spend {available} of {owner}'s funds, needs {requested}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        available: Amount,
        requested: Amount,
    },
    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    /// Overflow means the supply accounting itself is broken, not that the
    /// caller asked for something unreasonable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LedgerError::ArithmeticOverflow(_))
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
