use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places for all monetary values
pub const MONEY_SCALE: u32 = 2;

/// Round a monetary value to cents, half away from zero.
///
/// Commission math uses commercial rounding (0.005 -> 0.01), not the
/// banker's rounding `Decimal` defaults to.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Commission owed on an installment amount at the given percent.
pub fn commission_for(amount: Decimal, commission_percent: Decimal) -> Decimal {
    round_money(amount * commission_percent / Decimal::ONE_HUNDRED)
}
