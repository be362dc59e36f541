//! Tests for configuration

#[cfg(test)]
mod tests {
    use super::super::config::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.trading.symbol, "BTCUSDT");
        assert_eq!(config.trading.quantity, dec!(0.01));
        assert_eq!(config.risk.window, 20);
        assert_eq!(config.risk.risk_factor, dec!(0.02));
        assert_eq!(config.risk.reward_factor, dec!(0.04));
        assert!(config.risk.enable_hedge);
        assert_eq!(config.risk.hedge_threshold, dec!(0.03));
        assert_eq!(config.risk.hedge_ratio, dec!(0.5));
        assert_eq!(config.feed.backoff, "fixed");
        assert_eq!(config.feed.reconnect_delay_secs, 10);
        assert_eq!(config.strategy.min_momentum, dec!(0.002));
        assert_eq!(config.strategy.trade_cooldown_secs, 60);
        assert_eq!(config.error_log, "logs/error_log.txt");
        assert!(config.telegram.is_none());
        assert!(config.binance.testnet);
    }

    #[test]
    fn test_partial_override() {
        let toml_str = r#"
[trading]
symbol = "ETHUSDT"
quantity = "0.05"

[risk]
window = 30
risk_factor = "0.03"

[feed]
backoff = "jittered"
reconnect_delay_secs = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();

        assert_eq!(config.trading.symbol, "ETHUSDT");
        assert_eq!(config.trading.quantity, dec!(0.05));
        assert_eq!(config.risk.window, 30);
        assert_eq!(config.risk.risk_factor, dec!(0.03));
        // untouched sections keep their defaults
        assert_eq!(config.risk.reward_factor, dec!(0.04));
        assert_eq!(config.feed.backoff, "jittered");
        assert_eq!(config.feed.reconnect_delay_secs, 5);
        assert_eq!(config.feed.max_delay_secs, 300);
    }

    #[test]
    fn test_telegram_defaults() {
        let toml_str = r#"
bot_token = "123:abc"
chat_id = "12345"
"#;
        let config: TelegramConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.chat_id, "12345");
        assert!(config.notify_trades);
        assert!(config.notify_errors);
        assert!(config.notify_connection);
        assert!(config.notify_daily);
    }

    #[test]
    fn test_telegram_disabled_notifications() {
        let toml_str = r#"
bot_token = "123:abc"
chat_id = "12345"
notify_trades = false
notify_connection = false
"#;
        let config: TelegramConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.notify_trades);
        assert!(!config.notify_connection);
        assert!(config.notify_errors); // defaults to true
    }

    #[test]
    fn test_rest_base_follows_testnet_flag() {
        let mut binance = BinanceConfig::default();
        assert_eq!(binance.rest_base(), "https://testnet.binancefuture.com");

        binance.testnet = false;
        assert_eq!(binance.rest_base(), "https://fapi.binance.com");
    }

    #[test]
    fn test_stream_url_lowercases_symbol() {
        let binance = BinanceConfig::default();
        assert_eq!(
            binance.stream_url("BTCUSDT"),
            "wss://fstream.binance.com/ws/btcusdt@aggTrade"
        );
    }

    #[test]
    fn test_missing_credentials_detected() {
        let binance = BinanceConfig::default();
        assert!(matches!(
            binance.require_credentials(),
            Err(crate::error::BotError::ConfigurationMissing(_))
        ));

        let configured = BinanceConfig {
            api_key: "key".into(),
            api_secret: "secret".into(),
            ..BinanceConfig::default()
        };
        assert!(configured.require_credentials().is_ok());
    }

    #[test]
    fn test_validation_rejects_tiny_window() {
        let mut config = Config::default();
        config.risk.window = 2;
        assert!(matches!(
            config.validate(),
            Err(crate::error::BotError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validation_rejects_non_positive_quantity() {
        let mut config = Config::default();
        config.trading.quantity = dec!(0);
        assert!(config.validate().is_err());
    }
}
