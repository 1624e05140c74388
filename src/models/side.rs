//! Trade side for a futures position.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BotError;

/// Direction of a futures position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// The opposing side. Total involution: `s.opposite().opposite() == s`.
    pub fn opposite(&self) -> Side {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }

    /// Order side string the exchange expects for opening this position.
    pub fn as_order_side(&self) -> &'static str {
        match self {
            Side::Long => "BUY",
            Side::Short => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

impl FromStr for Side {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LONG" | "BUY" => Ok(Side::Long),
            "SHORT" | "SELL" => Ok(Side::Short),
            other => Err(BotError::InvalidInput(format!(
                "unrecognized side: {other}"
            ))),
        }
    }
}
