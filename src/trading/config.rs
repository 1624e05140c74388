//! Trading configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{BotError, BotResult};

/// Immutable per-symbol trading configuration.
///
/// Loaded once at startup and handed to the pricing engine at construction;
/// nothing reads it as ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeConfig {
    /// Margin asset, e.g. "USDT"
    pub quote_currency: String,

    /// Futures symbol, e.g. "BTCUSDT"
    pub symbol: String,

    /// Position leverage multiplier
    pub leverage: u32,

    /// Base TP/SL band as a fraction of margin (scaled down by leverage for price)
    pub tp_sl_rate: Decimal,

    /// Order quantity before any martingale doubling
    pub initial_quantity: Decimal,

    /// Taker fee as a fraction of notional, per fill
    pub fee_rate: Decimal,

    /// Minimum price increment for the symbol
    pub price_tick: Decimal,

    /// Minimum quantity increment for the symbol
    pub lot_step: Decimal,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            quote_currency: "USDT".to_string(),
            symbol: "BTCUSDT".to_string(),
            leverage: 10,
            tp_sl_rate: dec!(0.3), // 30% of margin -> 3% price move at 10x
            initial_quantity: dec!(0.001),
            fee_rate: dec!(0.0004), // 0.04% taker fee
            price_tick: dec!(0.1),
            lot_step: dec!(0.001),
        }
    }
}

impl TradeConfig {
    /// Check every parameter the pricing math divides or scales by.
    pub fn validate(&self) -> BotResult<()> {
        if self.symbol.is_empty() {
            return Err(BotError::Config("symbol must not be empty".to_string()));
        }
        if self.quote_currency.is_empty() {
            return Err(BotError::Config(
                "quote currency must not be empty".to_string(),
            ));
        }
        if self.leverage == 0 {
            return Err(BotError::InvalidInput(
                "leverage must be positive".to_string(),
            ));
        }
        if self.initial_quantity <= Decimal::ZERO {
            return Err(BotError::InvalidInput(
                "initial quantity must be positive".to_string(),
            ));
        }
        if self.tp_sl_rate <= Decimal::ZERO {
            return Err(BotError::InvalidInput(
                "TP/SL rate must be positive".to_string(),
            ));
        }
        if self.fee_rate < Decimal::ZERO {
            return Err(BotError::InvalidInput(
                "fee rate must not be negative".to_string(),
            ));
        }
        if self.price_tick <= Decimal::ZERO {
            return Err(BotError::InvalidInput(
                "price tick must be positive".to_string(),
            ));
        }
        if self.lot_step <= Decimal::ZERO {
            return Err(BotError::InvalidInput(
                "lot step must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
