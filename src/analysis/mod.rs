pub mod aggregator;
pub mod fallback;
pub mod rightsizing;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

pub use aggregator::aggregate;
pub use rightsizing::{calculate_total_savings, derive_recommendations};

/// Rounds to cents (half to even) for the wire format.
pub fn to_money(amount: Decimal) -> f64 {
    amount.round_dp(2).to_f64().unwrap_or_default()
}
