//! Pricing engine: order quantity, TP/SL trigger prices, affordable size.
//!
//! Pure arithmetic over a validated [`TradeConfig`]; no I/O. Callers fetch
//! mark price and balance through the API clients and pass the values in,
//! so everything here is testable without network access.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::{BotError, BotResult};
use crate::models::{Side, TpSlPrices};
use crate::trading::TradeConfig;

/// Derives order quantities and TP/SL trigger prices for the martingale cycle.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: TradeConfig,
}

impl PricingEngine {
    /// Create an engine from a config, rejecting invalid parameters up front.
    pub fn new(config: TradeConfig) -> BotResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TradeConfig {
        &self.config
    }

    /// Quantity for the next order: `initial_quantity * 2^stop_loss_times`.
    ///
    /// Grows unbounded with repeated stop-losses; any ceiling is the
    /// caller's responsibility.
    pub fn order_quantity(&self, stop_loss_times: u32) -> Decimal {
        (0..stop_loss_times).fold(self.config.initial_quantity, |qty, _| qty * dec!(2))
    }

    /// TP/SL trigger prices around the given mark price.
    ///
    /// The band widens with each prior stop-loss to recover the round-trip
    /// fee drag of the doubled re-entries: the effective rate is
    /// `tp_sl_rate + leverage * fee_rate * 2 * (stop_loss_times + 1)`,
    /// applied to price after scaling down by leverage. Both prices are
    /// rounded half-away-from-zero to the symbol's price tick.
    pub fn tpsl_prices(
        &self,
        side: Side,
        stop_loss_times: u32,
        mark_price: Decimal,
    ) -> BotResult<TpSlPrices> {
        if mark_price <= Decimal::ZERO {
            return Err(BotError::InvalidInput(format!(
                "mark price must be positive, got {mark_price}"
            )));
        }

        let leverage = Decimal::from(self.config.leverage);
        let order_cost_rate = leverage * self.config.fee_rate * dec!(2);
        let tpsl_rate =
            self.config.tp_sl_rate + order_cost_rate * Decimal::from(stop_loss_times + 1);
        let band = tpsl_rate / leverage;

        let higher = round_to_tick(mark_price * (Decimal::ONE + band), self.config.price_tick);
        let lower = round_to_tick(mark_price * (Decimal::ONE - band), self.config.price_tick);

        let (take_profit, stop_loss) = match side {
            Side::Long => (higher, lower),
            Side::Short => (lower, higher),
        };

        Ok(TpSlPrices {
            take_profit,
            stop_loss,
        })
    }

    /// Largest quantity the available balance can carry at the configured
    /// leverage, truncated toward zero at the lot step.
    pub fn available_quantity(&self, balance: Decimal, mark_price: Decimal) -> BotResult<Decimal> {
        if mark_price <= Decimal::ZERO {
            return Err(BotError::InvalidInput(format!(
                "mark price must be positive, got {mark_price}"
            )));
        }
        if balance < Decimal::ZERO {
            return Err(BotError::InvalidInput(format!(
                "balance must not be negative, got {balance}"
            )));
        }

        let available_funds = balance * Decimal::from(self.config.leverage);
        let lot_value = mark_price * self.config.lot_step;
        let mut quantity = (available_funds / lot_value).trunc() * self.config.lot_step;
        quantity.rescale(self.config.lot_step.scale());
        Ok(quantity)
    }
}

/// Round to the nearest tick multiple, half away from zero, and rescale so
/// the string form carries exactly the tick's decimal precision.
fn round_to_tick(value: Decimal, tick: Decimal) -> Decimal {
    let mut rounded = (value / tick)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * tick;
    rounded.rescale(tick.scale());
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn engine() -> PricingEngine {
        PricingEngine::new(TradeConfig {
            leverage: 10,
            tp_sl_rate: dec!(0.3),
            fee_rate: dec!(0.0004),
            initial_quantity: dec!(0.001),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_order_quantity_doubles_per_stop_loss() {
        let engine = engine();
        assert_eq!(engine.order_quantity(0), dec!(0.001));
        for n in 0..10 {
            assert_eq!(
                engine.order_quantity(n + 1),
                engine.order_quantity(n) * dec!(2)
            );
        }
        assert_eq!(engine.order_quantity(3), dec!(0.008));
    }

    #[test]
    fn test_tpsl_prices_long_worked_example() {
        // orderCostRate = 10 * 0.0004 * 2 = 0.008
        // tpslRate = 0.3 + 0.008 = 0.308, band = 0.0308
        let engine = engine();
        let prices = engine.tpsl_prices(Side::Long, 0, dec!(100)).unwrap();
        let (tp, sl) = prices.order_params();
        assert_eq!(tp, "103.1");
        assert_eq!(sl, "96.9");
    }

    #[test]
    fn test_tpsl_prices_short_swaps_sides() {
        let engine = engine();
        let long = engine.tpsl_prices(Side::Long, 0, dec!(100)).unwrap();
        let short = engine.tpsl_prices(Side::Short, 0, dec!(100)).unwrap();
        assert_eq!(short.take_profit, long.stop_loss);
        assert_eq!(short.stop_loss, long.take_profit);
    }

    #[test]
    fn test_tpsl_band_brackets_mark_price() {
        let engine = engine();
        let mark = dec!(43211.7);
        let prices = engine.tpsl_prices(Side::Long, 2, mark).unwrap();
        assert!(prices.take_profit > mark);
        assert!(prices.stop_loss < mark);

        let prices = engine.tpsl_prices(Side::Short, 2, mark).unwrap();
        assert!(prices.take_profit < mark);
        assert!(prices.stop_loss > mark);
    }

    #[test]
    fn test_tpsl_band_widens_with_stop_losses() {
        let engine = engine();
        let first = engine.tpsl_prices(Side::Long, 0, dec!(100)).unwrap();
        let second = engine.tpsl_prices(Side::Long, 1, dec!(100)).unwrap();
        assert!(second.take_profit > first.take_profit);
        assert!(second.stop_loss < first.stop_loss);
    }

    #[test]
    fn test_tpsl_rejects_nonpositive_mark_price() {
        let engine = engine();
        assert!(matches!(
            engine.tpsl_prices(Side::Long, 0, Decimal::ZERO),
            Err(BotError::InvalidInput(_))
        ));
        assert!(engine.tpsl_prices(Side::Long, 0, dec!(-5)).is_err());
    }

    #[test]
    fn test_available_quantity_worked_example() {
        // funds = 1000 * 10 = 10000; lot value = 50000 * 0.001 = 50
        // trunc(10000 / 50) * 0.001 = 0.200
        let engine = engine();
        let qty = engine.available_quantity(dec!(1000), dec!(50000)).unwrap();
        assert_eq!(qty, dec!(0.2));
        assert_eq!(qty.to_string(), "0.200");
    }

    #[test]
    fn test_available_quantity_truncates_toward_zero() {
        let engine = engine();
        // funds = 999; lot value = 50 -> 19.98 lots -> 19 lots
        let qty = engine.available_quantity(dec!(99.9), dec!(50000)).unwrap();
        assert_eq!(qty, dec!(0.019));
    }

    #[test]
    fn test_available_quantity_rejects_bad_inputs() {
        let engine = engine();
        assert!(engine.available_quantity(dec!(-1), dec!(100)).is_err());
        assert!(engine.available_quantity(dec!(100), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let config = TradeConfig {
            leverage: 0,
            ..Default::default()
        };
        assert!(PricingEngine::new(config).is_err());
    }

    #[test]
    fn test_round_to_tick_half_away_from_zero() {
        assert_eq!(round_to_tick(dec!(103.05), dec!(0.1)), dec!(103.1));
        assert_eq!(round_to_tick(dec!(103.04), dec!(0.1)), dec!(103.0));
        assert_eq!(
            round_to_tick(dec!(103.05), dec!(0.1)).to_string(),
            "103.1"
        );
        assert_eq!(
            round_to_tick(Decimal::from_str("103").unwrap(), dec!(0.1)).to_string(),
            "103.0"
        );
    }

    #[test]
    fn test_round_to_tick_respects_coarser_ticks() {
        assert_eq!(round_to_tick(dec!(43211.7), dec!(0.5)), dec!(43211.5));
        assert_eq!(round_to_tick(dec!(43211.8), dec!(0.5)), dec!(43212.0));
    }

    #[tokio::test]
    async fn test_sizing_from_stub_account_data() {
        use crate::api::AccountData;
        use crate::error::BotResult;

        struct StubAccount;

        #[async_trait::async_trait]
        impl AccountData for StubAccount {
            async fn available_balance(&self, _asset: &str) -> BotResult<Decimal> {
                Ok(dec!(1000))
            }
        }

        let engine = engine();
        let balance = StubAccount.available_balance("USDT").await.unwrap();
        let qty = engine.available_quantity(balance, dec!(50000)).unwrap();
        assert_eq!(qty, dec!(0.2));
    }
}
