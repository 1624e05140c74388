//! Side selection from the top-trader long/short position ratio.

use rust_decimal::Decimal;

use crate::models::Side;

/// Pick the side the top traders are leaning toward.
///
/// The ratio is `long accounts / short accounts` among the top traders for
/// the symbol; above 1.0 the crowd is net long. A ratio of exactly 1.0
/// resolves to Short, matching the strict comparison the strategy was
/// tuned with.
pub fn side_from_ratio(long_short_ratio: Decimal) -> Side {
    if long_short_ratio > Decimal::ONE {
        Side::Long
    } else {
        Side::Short
    }
}
