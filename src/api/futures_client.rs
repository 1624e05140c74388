//! Binance USDT-M futures REST client.
//!
//! Thin wrappers over the documented HTTP API: public market-data reads and
//! signed account reads. Only authenticated endpoints are signed; mark price
//! and the long/short ratio are public. Transient failures (timeouts, rate
//! limits, connection errors) retry with bounded exponential backoff before
//! surfacing; fatal errors surface immediately.

use std::time::Duration;

use backoff::ExponentialBackoff;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::signer::RequestSigner;
use crate::api::types::{ApiErrorBody, FuturesBalance, LongShortRatio, PremiumIndex};
use crate::api::{AccountData, MarketData};
use crate::error::{BotError, BotResult};

const FUTURES_API_BASE: &str = "https://fapi.binance.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_RECV_WINDOW: u64 = 5_000;
const MAX_RETRY_ELAPSED: Duration = Duration::from_secs(30);

/// API credentials for signed endpoints.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

/// REST client for the futures API.
pub struct FuturesClient {
    http: Client,
    base_url: String,
    api_key: String,
    signer: RequestSigner,
    recv_window: u64,
}

impl FuturesClient {
    /// Create a client with the default base URL and a per-call timeout.
    pub fn new(credentials: Credentials) -> BotResult<Self> {
        Self::with_base_url(credentials, FUTURES_API_BASE.to_string())
    }

    /// Create with a custom base URL (for testing).
    pub fn with_base_url(credentials: Credentials, base_url: String) -> BotResult<Self> {
        if credentials.api_key.is_empty() {
            return Err(BotError::Config("API key must not be empty".to_string()));
        }
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| BotError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            api_key: credentials.api_key,
            signer: RequestSigner::new(credentials.api_secret)?,
            recv_window: DEFAULT_RECV_WINDOW,
        })
    }

    /// Current mark price for a symbol.
    pub async fn mark_price(&self, symbol: &str) -> BotResult<Decimal> {
        let index: PremiumIndex = self
            .with_retry("premiumIndex", || async move {
                self.public_get("/fapi/v1/premiumIndex", &[("symbol", symbol.to_string())])
                    .await
            })
            .await?;
        if index.mark_price <= Decimal::ZERO {
            return Err(BotError::Parse(format!(
                "exchange returned non-positive mark price {} for {symbol}",
                index.mark_price
            )));
        }
        Ok(index.mark_price)
    }

    /// Margin balance available for new positions in the given asset.
    pub async fn available_balance(&self, asset: &str) -> BotResult<Decimal> {
        let balances: Vec<FuturesBalance> = self
            .with_retry("balance", || async move {
                self.signed_get("/fapi/v2/balance", &[]).await
            })
            .await?;
        balances
            .iter()
            .find(|b| b.asset == asset)
            .map(|b| b.available_balance)
            .ok_or_else(|| BotError::NotFound(format!("no balance entry for asset {asset}")))
    }

    /// Latest top-trader long/short position ratio for a symbol.
    pub async fn top_long_short_ratio(&self, symbol: &str, period: &str) -> BotResult<Decimal> {
        let entries: Vec<LongShortRatio> = self
            .with_retry("topLongShortPositionRatio", || async move {
                self.public_get(
                    "/futures/data/topLongShortPositionRatio",
                    &[
                        ("symbol", symbol.to_string()),
                        ("period", period.to_string()),
                        ("limit", "1".to_string()),
                    ],
                )
                .await
            })
            .await?;
        entries
            .first()
            .map(|e| e.long_short_ratio)
            .ok_or_else(|| {
                BotError::NotFound(format!("no long/short ratio data for {symbol} @ {period}"))
            })
    }

    /// Run an operation under bounded exponential backoff, retrying only
    /// errors classified as transient.
    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> BotResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = BotResult<T>>,
    {
        let policy = ExponentialBackoff {
            max_elapsed_time: Some(MAX_RETRY_ELAPSED),
            ..Default::default()
        };

        backoff::future::retry_notify(
            policy,
            move || {
                let attempt = call();
                async move {
                    attempt.await.map_err(|e| {
                        if e.is_retryable() {
                            backoff::Error::transient(e)
                        } else {
                            backoff::Error::permanent(e)
                        }
                    })
                }
            },
            |err, delay| {
                warn!(
                    operation = operation,
                    error = %err,
                    retry_in = ?delay,
                    "Transient API failure, backing off"
                );
            },
        )
        .await
    }

    async fn public_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> BotResult<T> {
        let query = build_query(params);
        let url = if query.is_empty() {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.base_url, endpoint, query)
        };

        debug!(endpoint = endpoint, "GET");

        let response = self.http.get(&url).send().await?;
        handle_response(response).await
    }

    async fn signed_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> BotResult<T> {
        let mut all_params = params.to_vec();
        all_params.push(("timestamp", timestamp_ms().to_string()));
        all_params.push(("recvWindow", self.recv_window.to_string()));

        let query = build_query(&all_params);
        let signature = self.signer.sign(&query);
        let url = format!(
            "{}{}?{}&signature={}",
            self.base_url, endpoint, query, signature
        );

        debug!(endpoint = endpoint, "GET (signed)");

        let response = self
            .http
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;
        handle_response(response).await
    }
}

/// Milliseconds since the Unix epoch, for the `timestamp` parameter.
fn timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Join parameters into a query string in the order given; the signature is
/// computed over this exact byte sequence, so ordering must be stable.
fn build_query(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> BotResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        serde_json::from_str(&body).map_err(|e| {
            BotError::Parse(format!(
                "{e} - body: {}",
                body.chars().take(200).collect::<String>()
            ))
        })
    } else if let Ok(err) = serde_json::from_str::<ApiErrorBody>(&body) {
        Err(map_error_code(err.code, &err.msg))
    } else {
        Err(BotError::Api {
            code: status.as_u16() as i32,
            message: body.chars().take(200).collect(),
        })
    }
}

/// Map exchange error codes onto the taxonomy so retry/fatal decisions see
/// the right kind.
fn map_error_code(code: i32, msg: &str) -> BotError {
    match code {
        -1003 | -1015 => BotError::RateLimited,
        -1002 | -2014 | -2015 => BotError::Auth(msg.to_string()),
        -1121 => BotError::InvalidInput(format!("invalid symbol: {msg}")),
        _ => BotError::Api {
            code,
            message: msg.to_string(),
        },
    }
}

#[async_trait::async_trait]
impl MarketData for FuturesClient {
    async fn mark_price(&self, symbol: &str) -> BotResult<Decimal> {
        FuturesClient::mark_price(self, symbol).await
    }

    async fn top_long_short_ratio(&self, symbol: &str, period: &str) -> BotResult<Decimal> {
        FuturesClient::top_long_short_ratio(self, symbol, period).await
    }
}

#[async_trait::async_trait]
impl AccountData for FuturesClient {
    async fn available_balance(&self, asset: &str) -> BotResult<Decimal> {
        FuturesClient::available_balance(self, asset).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_preserves_order() {
        let query = build_query(&[
            ("symbol", "BTCUSDT".to_string()),
            ("period", "5m".to_string()),
            ("limit", "1".to_string()),
        ]);
        assert_eq!(query, "symbol=BTCUSDT&period=5m&limit=1");
        assert_eq!(build_query(&[]), "");
    }

    #[test]
    fn test_error_code_mapping() {
        assert!(matches!(
            map_error_code(-1003, "Too many requests."),
            BotError::RateLimited
        ));
        assert!(matches!(
            map_error_code(-2015, "Invalid API-key."),
            BotError::Auth(_)
        ));
        assert!(matches!(
            map_error_code(-1121, "Invalid symbol."),
            BotError::InvalidInput(_)
        ));
        assert!(matches!(
            map_error_code(-4131, "Counterparty quality."),
            BotError::Api { code: -4131, .. }
        ));
    }

    #[test]
    fn test_rate_limit_mapping_is_retryable_and_auth_is_fatal() {
        assert!(map_error_code(-1003, "").is_retryable());
        assert!(map_error_code(-2015, "bad key").is_fatal());
    }

    #[test]
    fn test_client_rejects_empty_credentials() {
        let result = FuturesClient::new(Credentials {
            api_key: String::new(),
            api_secret: "secret".to_string(),
        });
        assert!(result.is_err());

        let result = FuturesClient::new(Credentials {
            api_key: "key".to_string(),
            api_secret: String::new(),
        });
        assert!(result.is_err());
    }
}
