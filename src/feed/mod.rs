//! Reconnecting market data feed
//!
//! Two-state listener over the exchange's aggTrade websocket stream:
//! CONNECTED while messages flow, DISCONNECTED on any error or close, then
//! reconnect after the backoff delay. Retries forever; a failing pipeline
//! pass is contained and never drops the connection.

pub mod backoff;

pub use backoff::BackoffPolicy;

use crate::error::Result;
use crate::notify::Notifier;
use async_trait::async_trait;
use futures_util::StreamExt;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Consumes one tick per inbound feed message
#[async_trait]
pub trait TickHandler: Send + Sync {
    /// One synchronous pipeline pass. An error aborts this cycle only.
    async fn on_tick(&self, price: Decimal) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedState {
    Connected,
    Disconnected,
}

pub struct FeedListener {
    url: String,
    backoff: BackoffPolicy,
    notifier: Arc<Notifier>,
}

impl FeedListener {
    pub fn new(url: String, backoff: BackoffPolicy, notifier: Arc<Notifier>) -> Self {
        Self {
            url,
            backoff,
            notifier,
        }
    }

    /// Run the listen/reconnect loop. Never returns; only process
    /// termination stops it.
    pub async fn run(&self, handler: Arc<dyn TickHandler>) {
        let mut state = FeedState::Disconnected;
        let mut failures: u32 = 0;

        loop {
            match connect_async(&self.url).await {
                Ok((stream, _)) => {
                    state = FeedState::Connected;
                    failures = 0;
                    info!(url = %self.url, ?state, "feed connected");
                    self.notifier.connection_up().await;

                    let (_, mut read) = stream.split();

                    while let Some(message) = read.next().await {
                        match message {
                            Ok(Message::Text(text)) => {
                                let Some(price) = parse_tick_price(text.as_str()) else {
                                    debug!("skipping message without a price field");
                                    continue;
                                };
                                if let Err(e) = handler.on_tick(price).await {
                                    // contained: the connection outlives the cycle
                                    warn!(error = %e, "pipeline pass failed");
                                }
                            }
                            Ok(Message::Close(frame)) => {
                                warn!(?frame, "feed closed by remote");
                                break;
                            }
                            Ok(_) => {}
                            Err(e) => {
                                warn!(error = %e, "feed stream error");
                                break;
                            }
                        }
                    }

                    state = FeedState::Disconnected;
                    warn!(?state, "feed disconnected");
                    self.notifier.connection_down().await;
                }
                Err(e) => {
                    state = FeedState::Disconnected;
                    warn!(?state, error = %e, "feed connection failed");
                }
            }

            let delay = self.backoff.delay(failures);
            failures = failures.saturating_add(1);
            info!(?delay, "reconnecting after backoff");
            sleep(delay).await;
        }
    }
}

/// Extract the trade price from an aggTrade payload. Handles both the
/// single-stream shape and the combined-stream `{"data": {...}}` wrapper.
fn parse_tick_price(text: &str) -> Option<Decimal> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let event = value.get("data").unwrap_or(&value);
    event.get("p")?.as_str()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_single_stream_payload() {
        let text = r#"{"e":"aggTrade","E":1700000000000,"s":"BTCUSDT","p":"35012.34","q":"0.012"}"#;
        assert_eq!(parse_tick_price(text), Some(dec!(35012.34)));
    }

    #[test]
    fn test_parse_combined_stream_payload() {
        let text = r#"{"stream":"btcusdt@aggTrade","data":{"e":"aggTrade","p":"35012.34"}}"#;
        assert_eq!(parse_tick_price(text), Some(dec!(35012.34)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_tick_price("not json"), None);
        assert_eq!(parse_tick_price(r#"{"e":"aggTrade"}"#), None);
        assert_eq!(parse_tick_price(r#"{"p":12.5}"#), None); // must be a string
    }
}
