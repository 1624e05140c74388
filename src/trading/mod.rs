//! Trading logic: configuration, pricing engine, side selection.

mod config;
mod pricing;
mod signal;

pub use config::TradeConfig;
pub use pricing::PricingEngine;
pub use signal::side_from_ratio;
