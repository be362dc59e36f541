//! Request signing for the Binance futures REST API
//!
//! Signed endpoints take an HMAC-SHA256 signature of the query string,
//! keyed with the API secret, appended as the `signature` parameter.

use crate::error::{BotError, Result};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 signature over a query string
pub fn sign(secret: &str, query: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| BotError::ConfigurationMissing("binance.api_secret".into()))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Current timestamp in milliseconds, as the API expects
pub fn timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_signature_vector() {
        // Example from the Binance API documentation
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";

        let sig = sign(secret, query).unwrap();
        assert_eq!(
            sig,
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_signature_differs_per_query() {
        let a = sign("secret", "symbol=BTCUSDT&leverage=5").unwrap();
        let b = sign("secret", "symbol=BTCUSDT&leverage=3").unwrap();
        assert_ne!(a, b);
    }
}
