use std::fmt;

use alloy_primitives::U256;
use serde::{Serialize, Serializer};

use crate::errors::StakeError;

/// Fixed-point scale of every token handled by the guardian.
pub const TOKEN_DECIMALS: u32 = 18;

/// Fractional digits used for reward-rate values.
pub const REWARD_DECIMALS: u32 = 8;

/// Fractional digits used for balances and amounts shown to the user.
pub const DEFAULT_DECIMALS: u32 = 2;

/// Fractional digits of the annualized rate.
pub const APR_DECIMALS: u32 = 3;

fn pow10(exp: u32) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// Drops `digits` decimal digits from `value`, rounding half to even.
fn round_half_even(value: U256, digits: u32) -> U256 {
    if digits == 0 {
        return value;
    }
    let divisor = pow10(digits);
    let quotient = value / divisor;
    let remainder = value % divisor;
    let half = divisor / U256::from(2u64);

    if remainder > half || (remainder == half && quotient.bit(0)) {
        quotient + U256::from(1u64)
    } else {
        quotient
    }
}

/// A token amount in base units (18-decimal fixed point), as read from chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(U256);

impl Amount {
    pub const ZERO: Amount = Amount(U256::ZERO);

    pub fn new(base_units: U256) -> Self {
        Amount(base_units)
    }

    pub fn base_units(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Amount(value)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Amount(U256::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decimal value kept as a scaled integer with a fixed number of
/// fractional digits. Presentation only; never fed back into chain calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayAmount {
    scaled: U256,
    decimals: u32,
}

impl DisplayAmount {
    /// `scaled / 10^decimals`
    pub fn new(scaled: U256, decimals: u32) -> Self {
        DisplayAmount { scaled, decimals }
    }

    pub fn scaled(&self) -> U256 {
        self.scaled
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Re-render at a different precision. Reducing precision rounds half to
    /// even; increasing it pads with zeros.
    pub fn rescale(&self, decimals: u32) -> DisplayAmount {
        let scaled = if decimals >= self.decimals {
            self.scaled * pow10(decimals - self.decimals)
        } else {
            round_half_even(self.scaled, self.decimals - decimals)
        };
        DisplayAmount { scaled, decimals }
    }
}

impl fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.decimals == 0 {
            return write!(f, "{}", self.scaled);
        }
        let unit = pow10(self.decimals);
        let whole = self.scaled / unit;
        let fraction = (self.scaled % unit).to_string();
        write!(
            f,
            "{}.{:0>width$}",
            whole,
            fraction,
            width = self.decimals as usize
        )
    }
}

impl Serialize for DisplayAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Rendering precision for a converted amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayContext {
    /// Reward rates and intermediate reward values (8 digits).
    Reward,
    /// Balances and everything else (2 digits).
    Default,
}

impl DisplayContext {
    pub fn decimals(&self) -> u32 {
        match self {
            DisplayContext::Reward => REWARD_DECIMALS,
            DisplayContext::Default => DEFAULT_DECIMALS,
        }
    }
}

/// Converts between base units and human-decimal amounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitConverter;

impl UnitConverter {
    pub fn new() -> Self {
        UnitConverter
    }

    pub fn to_display(&self, amount: Amount, context: DisplayContext) -> DisplayAmount {
        let decimals = context.decimals();
        let scaled = round_half_even(amount.base_units(), TOKEN_DECIMALS - decimals);
        DisplayAmount::new(scaled, decimals)
    }

    /// Parse a non-negative decimal string into base units.
    pub fn to_base_units(&self, display: &str) -> Result<Amount, StakeError> {
        let input = display.trim();
        if input.is_empty() {
            return Err(StakeError::InvalidAmount("amount is empty".to_string()));
        }
        if input.starts_with('-') {
            return Err(StakeError::InvalidAmount(format!(
                "amount must not be negative: {}",
                input
            )));
        }

        let (whole, fraction) = match input.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (input, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
            return Err(StakeError::InvalidAmount(format!("not a decimal number: {}", input)));
        }
        if fraction.len() > TOKEN_DECIMALS as usize {
            return Err(StakeError::InvalidAmount(format!(
                "more than {} fractional digits: {}",
                TOKEN_DECIMALS, input
            )));
        }

        let overflow = || StakeError::InvalidAmount(format!("amount out of range: {}", input));
        let parse = |digits: &str| -> Result<U256, StakeError> {
            if digits.is_empty() {
                Ok(U256::ZERO)
            } else {
                U256::from_str_radix(digits, 10).map_err(|_| overflow())
            }
        };

        let whole_units = parse(whole)?
            .checked_mul(pow10(TOKEN_DECIMALS))
            .ok_or_else(overflow)?;
        let fraction_units =
            parse(fraction)? * pow10(TOKEN_DECIMALS - fraction.len() as u32);

        whole_units
            .checked_add(fraction_units)
            .map(Amount)
            .ok_or_else(overflow)
    }
}
