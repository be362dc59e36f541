//! Operator notifications via Telegram
//!
//! Every send is best-effort: delivery failures are logged and swallowed,
//! never surfaced to the trading path.

pub mod error_log;

pub use error_log::{ErrorLog, ErrorReporter};

use crate::config::TelegramConfig;
use crate::error::{BotError, Result};
use crate::types::{RiskParameters, TradeIntent};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct SendMessageRequest {
    chat_id: String,
    text: String,
    parse_mode: String,
}

/// Telegram notifier; `disabled()` turns every send into a no-op
pub struct Notifier {
    http: Client,
    config: Option<TelegramConfig>,
}

impl Notifier {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            http: Client::new(),
            config: Some(config),
        }
    }

    pub fn disabled() -> Self {
        Self {
            http: Client::new(),
            config: None,
        }
    }

    pub fn from_config(config: &Option<TelegramConfig>) -> Self {
        match config {
            Some(cfg) => Self::new(cfg.clone()),
            None => Self::disabled(),
        }
    }

    /// Fire-and-forget send; failures are logged, never propagated
    pub async fn send(&self, text: &str) {
        if let Err(e) = self.post(text).await {
            warn!(error = %e, "telegram delivery failed");
        }
    }

    async fn post(&self, text: &str) -> Result<()> {
        let Some(config) = &self.config else {
            debug!("notifier disabled, dropping message");
            return Ok(());
        };

        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            config.bot_token
        );
        let request = SendMessageRequest {
            chat_id: config.chat_id.clone(),
            text: text.to_string(),
            parse_mode: "HTML".to_string(),
        };

        let resp = self.http.post(&url).json(&request).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::Notify(format!("{status}: {body}")));
        }

        Ok(())
    }

    pub async fn startup(&self, symbol: &str, dry_run: bool) {
        let mode = if dry_run { "paper" } else { "live" };
        self.send(&format!(
            "✅ <b>BOT STARTED</b>\n📌 Symbol: {symbol}\n⚙️ Mode: {mode}"
        ))
        .await;
    }

    pub async fn trade_opened(
        &self,
        intent: &TradeIntent,
        params: &RiskParameters,
        entry_price: Decimal,
    ) {
        if !self.wants(|c| c.notify_trades) {
            return;
        }
        self.send(&format_trade_alert(intent, params, entry_price))
            .await;
    }

    pub async fn error_alert(&self, component: &str, message: &str) {
        if !self.wants(|c| c.notify_errors) {
            return;
        }
        self.send(&format!("⚠️ <b>BOT ERROR</b>\n{component}: {message}"))
            .await;
    }

    pub async fn connection_up(&self) {
        if !self.wants(|c| c.notify_connection) {
            return;
        }
        self.send("✅ Market data feed connected").await;
    }

    pub async fn connection_down(&self) {
        if !self.wants(|c| c.notify_connection) {
            return;
        }
        self.send("🔄 Market data feed disconnected, reconnecting...")
            .await;
    }

    pub async fn daily_report(&self, profit: Decimal, loss: Decimal, trade_count: usize) {
        if !self.wants(|c| c.notify_daily) {
            return;
        }
        self.send(&format_daily_report(profit, loss, trade_count))
            .await;
    }

    fn wants(&self, flag: impl Fn(&TelegramConfig) -> bool) -> bool {
        self.config.as_ref().map(flag).unwrap_or(true)
    }
}

fn format_trade_alert(
    intent: &TradeIntent,
    params: &RiskParameters,
    entry_price: Decimal,
) -> String {
    format!(
        "🚀 <b>TRADE EXECUTED</b>\n\
         📌 <b>Symbol:</b> {}\n\
         📈 <b>Direction:</b> {}\n\
         💰 <b>Quantity:</b> {}\n\
         ⚡ <b>Leverage:</b> {}x\n\
         💲 <b>Entry:</b> {} USDT\n\
         🛑 <b>Stop-Loss:</b> {} USDT\n\
         🎯 <b>Take-Profit:</b> {} USDT",
        intent.symbol,
        intent.direction,
        intent.quantity,
        intent.leverage,
        entry_price,
        params.stop_loss_price,
        params.take_profit_price,
    )
}

fn format_daily_report(profit: Decimal, loss: Decimal, trade_count: usize) -> String {
    format!(
        "📅 <b>DAILY REPORT</b>\n\
         💰 <b>Profit:</b> {profit} USDT\n\
         🔻 <b>Loss:</b> {loss} USDT\n\
         📊 <b>Trades:</b> {trade_count}"
    )
}
