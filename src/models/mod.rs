//! Data models for sides and derived trigger prices.

mod prices;
mod side;

pub use prices::TpSlPrices;
pub use side::Side;
