//! Binance USDT-M Futures Martingale Helper Bot
//!
//! Computes martingale order quantities and TP/SL trigger prices for a
//! single futures symbol, and wraps the handful of signed REST reads the
//! strategy needs (balance, mark price, top-trader long/short ratio).

mod api;
mod error;
mod models;
mod notify;
mod trading;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::api::{Credentials, FuturesClient};
use crate::error::BotError;
use crate::models::Side;
use crate::notify::NotificationSink;
use crate::trading::{side_from_ratio, PricingEngine, TradeConfig};

/// Martingale helper CLI for Binance USDT-M futures.
#[derive(Parser)]
#[command(name = "martingale-bot")]
#[command(about = "Quantity and TP/SL helpers for a Binance futures martingale strategy", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(flatten)]
    trade: TradeArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Trade parameters, overridable from the environment.
#[derive(Args)]
struct TradeArgs {
    /// Futures symbol
    #[arg(long, env = "SYMBOL", default_value = "BTCUSDT")]
    symbol: String,

    /// Margin asset
    #[arg(long, env = "QUOTE_CURRENCY", default_value = "USDT")]
    quote_currency: String,

    /// Position leverage
    #[arg(long, env = "LEVERAGE", default_value = "10")]
    leverage: u32,

    /// Base TP/SL band as a fraction of margin
    #[arg(long, env = "TP_SL_RATE", default_value = "0.3")]
    tp_sl_rate: Decimal,

    /// Order quantity before martingale doubling
    #[arg(long, env = "INITIAL_QUANTITY", default_value = "0.001")]
    initial_quantity: Decimal,

    /// Taker fee rate per fill
    #[arg(long, env = "FEE_RATE", default_value = "0.0004")]
    fee_rate: Decimal,

    /// Price tick for TP/SL rounding
    #[arg(long, env = "PRICE_TICK", default_value = "0.1")]
    price_tick: Decimal,

    /// Lot step for quantity truncation
    #[arg(long, env = "LOT_STEP", default_value = "0.001")]
    lot_step: Decimal,
}

impl TradeArgs {
    fn to_config(&self) -> TradeConfig {
        TradeConfig {
            quote_currency: self.quote_currency.clone(),
            symbol: self.symbol.clone(),
            leverage: self.leverage,
            tp_sl_rate: self.tp_sl_rate,
            initial_quantity: self.initial_quantity,
            fee_rate: self.fee_rate,
            price_tick: self.price_tick,
            lot_step: self.lot_step,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective trading configuration
    Config,

    /// Fetch the current mark price
    Price,

    /// Fetch the available margin balance
    Balance,

    /// Pick a trade side from the top-trader long/short ratio
    Side {
        /// Ratio period (5m, 15m, 30m, 1h, ...)
        #[arg(short, long, default_value = "5m")]
        period: String,
    },

    /// Largest quantity the available balance can carry
    Size,

    /// Order quantity and TP/SL prices for the next martingale entry
    Quote {
        /// Position side (long or short)
        #[arg(short, long)]
        side: Side,

        /// Stop-losses already hit in this cycle
        #[arg(long, default_value = "0")]
        stop_losses: u32,

        /// Mark price to quote against (fetched live when omitted)
        #[arg(short, long)]
        mark_price: Option<Decimal>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let notifier = notify::from_token(std::env::var("LINE_NOTIFY_TOKEN").ok());

    match run(cli).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!(error = %e, "Command failed");
            if e.is_fatal() {
                notifier
                    .notify(&format!("martingale-bot fatal error: {e}"))
                    .await;
            }
            Err(e.into())
        }
    }
}

async fn run(cli: Cli) -> Result<(), BotError> {
    let config = cli.trade.to_config();
    let engine = PricingEngine::new(config)?;
    let config = engine.config();

    match cli.command {
        Commands::Config => {
            println!("\n=== Trading Configuration ===\n");
            println!("Symbol:           {}", config.symbol);
            println!("Quote Currency:   {}", config.quote_currency);
            println!("Leverage:         {}x", config.leverage);
            println!("TP/SL Rate:       {}", config.tp_sl_rate);
            println!("Initial Quantity: {}", config.initial_quantity);
            println!("Fee Rate:         {}", config.fee_rate);
            println!("Price Tick:       {}", config.price_tick);
            println!("Lot Step:         {}", config.lot_step);
        }

        Commands::Price => {
            let client = client_from_env()?;
            let price = client.mark_price(&config.symbol).await?;
            info!(symbol = %config.symbol, price = %price, "Fetched mark price");
            println!("{price}");
        }

        Commands::Balance => {
            let client = client_from_env()?;
            let balance = client.available_balance(&config.quote_currency).await?;
            info!(asset = %config.quote_currency, balance = %balance, "Fetched balance");
            println!("{balance}");
        }

        Commands::Side { period } => {
            let client = client_from_env()?;
            let ratio = client
                .top_long_short_ratio(&config.symbol, &period)
                .await?;
            let side = side_from_ratio(ratio);
            info!(ratio = %ratio, side = %side, "Selected side");
            println!("{side}");
        }

        Commands::Size => {
            let client = client_from_env()?;
            let balance = client.available_balance(&config.quote_currency).await?;
            let price = client.mark_price(&config.symbol).await?;
            let quantity = engine.available_quantity(balance, price)?;
            println!(
                "balance={} mark={} -> max quantity {}",
                balance, price, quantity
            );
        }

        Commands::Quote {
            side,
            stop_losses,
            mark_price,
        } => {
            let mark = match mark_price {
                Some(price) => price,
                None => client_from_env()?.mark_price(&config.symbol).await?,
            };

            let quantity = engine.order_quantity(stop_losses);
            let prices = engine.tpsl_prices(side, stop_losses, mark)?;
            let (tp, sl) = prices.order_params();

            println!("\n=== {} {} @ {} ===", side, config.symbol, mark);
            println!("Entry side:    {}", side.as_order_side());
            println!("Close side:    {}", side.opposite().as_order_side());
            println!("Quantity:      {quantity}");
            println!("Take Profit:   {tp}");
            println!("Stop Loss:     {sl}");
            println!("Stop-losses:   {stop_losses}");
        }
    }

    Ok(())
}

/// Build a REST client from `BINANCE_API_KEY` / `BINANCE_API_SECRET`.
fn client_from_env() -> Result<FuturesClient, BotError> {
    let api_key = std::env::var("BINANCE_API_KEY")
        .map_err(|_| BotError::Config("BINANCE_API_KEY is not set".to_string()))?;
    let api_secret = std::env::var("BINANCE_API_SECRET")
        .map_err(|_| BotError::Config("BINANCE_API_SECRET is not set".to_string()))?;
    FuturesClient::new(Credentials {
        api_key,
        api_secret,
    })
}
