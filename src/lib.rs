//! Volatility-Adaptive Binance Futures Bot
//!
//! A Rust-based automated trading system for Binance USDT-M futures.
//!
//! ## Architecture
//!
//! ```text
//! Feed (WebSocket) → Engine → Strategy (Direction) → Risk → Executor → Notifier
//!                       ↑                              ↑
//!                 Market (Price Window,          Leverage tiers,
//!                  Volatility Estimate)          Stop/Take levels, Hedge
//! ```

pub mod analysis;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod feed;
pub mod market;
pub mod notify;
pub mod risk;
pub mod strategy;
pub mod types;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod types_tests;
