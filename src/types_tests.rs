//! Tests for core domain types

#[cfg(test)]
mod tests {
    use super::super::types::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_direction_sides() {
        assert_eq!(Direction::Long.entry_side(), Some(OrderSide::Buy));
        assert_eq!(Direction::Long.exit_side(), Some(OrderSide::Sell));
        assert_eq!(Direction::Short.entry_side(), Some(OrderSide::Sell));
        assert_eq!(Direction::Short.exit_side(), Some(OrderSide::Buy));
        assert_eq!(Direction::Flat.entry_side(), None);
        assert_eq!(Direction::Flat.exit_side(), None);
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Long.to_string(), "LONG");
        assert_eq!(Direction::Short.to_string(), "SHORT");
        assert_eq!(Direction::Flat.to_string(), "FLAT");
    }

    #[test]
    fn test_order_kind_wire_names() {
        assert_eq!(OrderKind::Market.as_str(), "MARKET");
        assert_eq!(OrderKind::StopMarket.as_str(), "STOP_MARKET");
        assert_eq!(OrderKind::TakeProfitMarket.as_str(), "TAKE_PROFIT_MARKET");
    }

    #[test]
    fn test_order_request_constructors() {
        let market = OrderRequest::market("BTCUSDT", OrderSide::Buy, dec!(0.01));
        assert_eq!(market.kind, OrderKind::Market);
        assert_eq!(market.stop_price, None);

        let stop = OrderRequest::stop_market("BTCUSDT", OrderSide::Sell, dec!(0.01), dec!(34000));
        assert_eq!(stop.kind, OrderKind::StopMarket);
        assert_eq!(stop.stop_price, Some(dec!(34000)));

        let tp =
            OrderRequest::take_profit_market("BTCUSDT", OrderSide::Sell, dec!(0.01), dec!(36000));
        assert_eq!(tp.kind, OrderKind::TakeProfitMarket);
        assert_eq!(tp.stop_price, Some(dec!(36000)));
    }

    #[test]
    fn test_client_order_ids_are_unique() {
        let a = OrderRequest::market("BTCUSDT", OrderSide::Buy, dec!(0.01));
        let b = OrderRequest::market("BTCUSDT", OrderSide::Buy, dec!(0.01));
        assert_ne!(a.client_order_id, b.client_order_id);
    }

    #[test]
    fn test_price_sample_now() {
        let sample = PriceSample::now(dec!(35000));
        assert_eq!(sample.price, dec!(35000));
    }
}
