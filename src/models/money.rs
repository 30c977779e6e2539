//! Currency tagging and display formatting for amounts.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Separator between digit groups and before the currency symbol.
const NO_BREAK_SPACE: char = '\u{a0}';

/// Size of a digit group in the integer part.
const GROUP_SIZE: usize = 3;

/// Currency used to tag amounts at display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Russian rouble, the backend's bookkeeping currency.
    #[default]
    Rub,
    /// US dollar.
    Usd,
    /// Euro.
    Eur,
}

impl Currency {
    /// Returns the ISO 4217 code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Rub => "RUB",
            Self::Usd => "USD",
            Self::Eur => "EUR",
        }
    }

    /// Returns the display symbol.
    #[inline]
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Rub => "₽",
            Self::Usd => "$",
            Self::Eur => "€",
        }
    }
}

/// An amount tagged with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Money {
    /// Signed amount.
    pub amount: Decimal,
    /// Currency the amount is expressed in.
    pub currency: Currency,
}

impl Money {
    /// Tags `amount` with `currency`.
    #[inline]
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }
}

impl core::fmt::Display for Money {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&format_money(self.amount, self.currency))
    }
}

/// Formats an amount the way the dashboard shows money: two decimals,
/// comma decimal separator, no-break-space digit groups and a trailing
/// currency symbol, e.g. `12 345,60 ₽`.
#[must_use]
pub fn format_money(amount: Decimal, currency: Currency) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let magnitude = format!("{:.2}", rounded.abs());
    let (integer, fraction) = magnitude.split_once('.').unwrap_or((magnitude.as_str(), "00"));

    let mut out = String::with_capacity(magnitude.len() + 8);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&group_digits(integer));
    out.push(',');
    out.push_str(fraction);
    out.push(NO_BREAK_SPACE);
    out.push_str(currency.symbol());
    out
}

/// Inserts group separators every three digits from the right.
fn group_digits(digits: &str) -> String {
    let len = digits.chars().count();
    if len <= GROUP_SIZE {
        return digits.to_owned();
    }
    let mut out = String::with_capacity(len + len / GROUP_SIZE * NO_BREAK_SPACE.len_utf8());
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (len - index) % GROUP_SIZE == 0 {
            out.push(NO_BREAK_SPACE);
        }
        out.push(ch);
    }
    out
}
