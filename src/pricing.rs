//! Deal pricing.
//!
//! Prices are kept exact (`Decimal`) until they are shown or summed into a
//! cart total, at which point they are rounded to cents.

use rust_decimal::{Decimal, RoundingStrategy};

const CENTS: u32 = 2;

/// `normal_price` minus `discount` percent of it. No discount leaves the price untouched.
pub fn price_with_discount(normal_price: Decimal, discount: Option<Decimal>) -> Decimal {
    match discount {
        Some(discount) => normal_price - normal_price * (discount / Decimal::ONE_HUNDRED),
        None => normal_price,
    }
}

/// Rounds half away from zero and always carries two decimal places.
pub fn round_price(price: Decimal) -> Decimal {
    let mut rounded = price.round_dp_with_strategy(CENTS, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CENTS);
    rounded
}
