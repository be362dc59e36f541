//! Configuration loading
//!
//! Layered config: TOML file, then `FUTURES_BOT_*` environment overrides
//! (e.g. `FUTURES_BOT_BINANCE__API_KEY`).

use crate::error::{BotError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub binance: BinanceConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    /// Append-only failure log, one line per reported error
    #[serde(default = "default_error_log")]
    pub error_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            binance: BinanceConfig::default(),
            feed: FeedConfig::default(),
            trading: TradingConfig::default(),
            risk: RiskConfig::default(),
            strategy: StrategyConfig::default(),
            telegram: None,
            error_log: default_error_log(),
        }
    }
}

impl Config {
    /// Load config from a TOML file (optional) plus environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path).to_string();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&expanded).required(false))
            .add_source(
                config::Environment::with_prefix("FUTURES_BOT")
                    .separator("__"),
            )
            .build()?;

        let cfg: Config = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.risk.window < 3 {
            return Err(BotError::InvalidInput(format!(
                "risk.window must be at least 3, got {}",
                self.risk.window
            )));
        }
        if self.trading.quantity <= Decimal::ZERO {
            return Err(BotError::InvalidInput(format!(
                "trading.quantity must be positive, got {}",
                self.trading.quantity
            )));
        }
        if self.risk.risk_factor <= Decimal::ZERO || self.risk.reward_factor <= Decimal::ZERO {
            return Err(BotError::InvalidInput(
                "risk.risk_factor and risk.reward_factor must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Binance USDT-M futures connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    /// Route orders to the futures testnet
    #[serde(default = "default_true")]
    pub testnet: bool,
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    #[serde(default = "default_testnet_rest_url")]
    pub testnet_rest_url: String,
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            testnet: true,
            rest_url: default_rest_url(),
            testnet_rest_url: default_testnet_rest_url(),
            ws_url: default_ws_url(),
            recv_window_ms: default_recv_window_ms(),
        }
    }
}

impl BinanceConfig {
    pub fn rest_base(&self) -> &str {
        if self.testnet {
            &self.testnet_rest_url
        } else {
            &self.rest_url
        }
    }

    /// aggTrade stream URL for a symbol
    pub fn stream_url(&self, symbol: &str) -> String {
        format!(
            "{}/{}@aggTrade",
            self.ws_url.trim_end_matches('/'),
            symbol.to_lowercase()
        )
    }

    pub fn require_credentials(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(BotError::ConfigurationMissing("binance.api_key".into()));
        }
        if self.api_secret.is_empty() {
            return Err(BotError::ConfigurationMissing("binance.api_secret".into()));
        }
        Ok(())
    }
}

/// Feed reconnect behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Backoff strategy: "fixed", "exponential" or "jittered"
    #[serde(default = "default_backoff")]
    pub backoff: String,
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
    /// Cap for exponential/jittered backoff
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            backoff: default_backoff(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

/// What to trade
#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            quantity: default_quantity(),
        }
    }
}

/// Risk parameter calibration
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    /// Rolling window (samples) for the volatility estimate
    #[serde(default = "default_window")]
    pub window: usize,
    /// Stop-loss percentage at the top of the volatility band
    #[serde(default = "default_risk_factor")]
    pub risk_factor: Decimal,
    /// Take-profit percentage at the top of the volatility band
    #[serde(default = "default_reward_factor")]
    pub reward_factor: Decimal,
    #[serde(default = "default_true")]
    pub enable_hedge: bool,
    /// Volatility above which a protective hedge is opened
    #[serde(default = "default_hedge_threshold")]
    pub hedge_threshold: Decimal,
    /// Hedge size as a fraction of the main trade quantity
    #[serde(default = "default_hedge_ratio")]
    pub hedge_ratio: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            risk_factor: default_risk_factor(),
            reward_factor: default_reward_factor(),
            enable_hedge: true,
            hedge_threshold: default_hedge_threshold(),
            hedge_ratio: default_hedge_ratio(),
        }
    }
}

/// Decision source tuning
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    /// Minimum window-edge move (fraction) before a direction is signalled
    #[serde(default = "default_min_momentum")]
    pub min_momentum: Decimal,
    /// Seconds between order placements; 0 disables the cooldown
    #[serde(default = "default_trade_cooldown_secs")]
    pub trade_cooldown_secs: u64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            min_momentum: default_min_momentum(),
            trade_cooldown_secs: default_trade_cooldown_secs(),
        }
    }
}

/// Telegram notification settings
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    #[serde(default = "default_true")]
    pub notify_trades: bool,
    #[serde(default = "default_true")]
    pub notify_errors: bool,
    #[serde(default = "default_true")]
    pub notify_connection: bool,
    #[serde(default = "default_true")]
    pub notify_daily: bool,
}

fn default_true() -> bool {
    true
}

fn default_rest_url() -> String {
    "https://fapi.binance.com".to_string()
}

fn default_testnet_rest_url() -> String {
    "https://testnet.binancefuture.com".to_string()
}

fn default_ws_url() -> String {
    "wss://fstream.binance.com/ws".to_string()
}

fn default_recv_window_ms() -> u64 {
    5000
}

fn default_backoff() -> String {
    "fixed".to_string()
}

fn default_reconnect_delay_secs() -> u64 {
    10
}

fn default_max_delay_secs() -> u64 {
    300
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}

fn default_quantity() -> Decimal {
    dec!(0.01)
}

fn default_window() -> usize {
    20
}

fn default_risk_factor() -> Decimal {
    dec!(0.02)
}

fn default_reward_factor() -> Decimal {
    dec!(0.04)
}

fn default_hedge_threshold() -> Decimal {
    dec!(0.03)
}

fn default_hedge_ratio() -> Decimal {
    dec!(0.5)
}

fn default_min_momentum() -> Decimal {
    dec!(0.002)
}

fn default_trade_cooldown_secs() -> u64 {
    60
}

fn default_error_log() -> String {
    "logs/error_log.txt".to_string()
}
