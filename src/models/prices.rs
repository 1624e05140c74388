//! Take-profit / stop-loss trigger price pair.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// TP/SL trigger prices for closing a position.
///
/// Both prices are already rounded and rescaled to the symbol's price tick,
/// so their `Display` form carries exactly the decimal precision the
/// exchange expects in order parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TpSlPrices {
    /// Price at which the position closes in profit
    pub take_profit: Decimal,

    /// Price at which the position closes at a loss
    pub stop_loss: Decimal,
}

impl TpSlPrices {
    /// Price strings for the `stopPrice` order parameters.
    pub fn order_params(&self) -> (String, String) {
        (self.take_profit.to_string(), self.stop_loss.to_string())
    }
}
