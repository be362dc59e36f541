//! Volatility-adaptive Binance USDT-M futures trading bot

use clap::{Parser, Subcommand};
use futures_bot::{
    analysis::MonteCarlo,
    client::{BinanceFutures, FuturesVenue, PaperVenue},
    config::Config,
    engine::Engine,
    executor::OrderSequencer,
    feed::{BackoffPolicy, FeedListener, TickHandler},
    notify::Notifier,
    risk::RiskCalculator,
    strategy::MomentumDecision,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "futures-bot")]
#[command(about = "Volatility-adaptive futures trading bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the trading bot
    Run {
        /// Paper trading mode (no orders reach the exchange)
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the current ticker and mark price
    Price,
    /// Compute risk parameters for an entry price and volatility
    Risk {
        entry: Decimal,
        volatility: Decimal,
    },
    /// Monte Carlo price projection from recent candles
    Simulate {
        /// Number of simulated paths
        #[arg(long, default_value = "1000")]
        paths: usize,
        /// Path length in candles
        #[arg(long, default_value = "30")]
        horizon: usize,
    },
    /// Show open positions
    Status,
    /// Close the open position for a symbol
    Close {
        /// Defaults to the configured trading symbol
        symbol: Option<String>,
    },
    /// Send a position report to Telegram
    Report,
    /// Test the Telegram notification channel
    TestNotify,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run { dry_run } => run_bot(config, dry_run).await,
        Commands::Price => show_price(config).await,
        Commands::Risk { entry, volatility } => show_risk(config, entry, volatility),
        Commands::Simulate { paths, horizon } => simulate(config, paths, horizon).await,
        Commands::Status => show_status(config).await,
        Commands::Close { symbol } => close_position(config, symbol).await,
        Commands::Report => send_report(config).await,
        Commands::TestNotify => test_notify(config).await,
    }
}

async fn run_bot(config: Config, dry_run: bool) -> anyhow::Result<()> {
    tracing::info!(symbol = %config.trading.symbol, dry_run, "starting futures bot");

    if config.telegram.is_none() {
        tracing::warn!("telegram not configured, notifications disabled");
    }
    let notifier = Arc::new(Notifier::from_config(&config.telegram));
    notifier.startup(&config.trading.symbol, dry_run).await;

    let paper = if dry_run {
        tracing::warn!("DRY RUN mode: orders go to the paper venue");
        Some(Arc::new(PaperVenue::new()))
    } else {
        config.binance.require_credentials()?;
        None
    };

    let venue: Arc<dyn FuturesVenue> = match &paper {
        Some(paper) => paper.clone(),
        None => Arc::new(BinanceFutures::new(&config.binance)?),
    };

    let decision = Arc::new(MomentumDecision::new(config.strategy.min_momentum));
    let engine = Arc::new(Engine::new(
        &config,
        OrderSequencer::new(venue),
        decision,
        notifier.clone(),
    ));

    // Seed the window from recent candles so the estimator has a full
    // window before live ticks arrive. Best-effort: the window fills from
    // the stream anyway.
    let market_data = BinanceFutures::new(&config.binance)?;
    match market_data
        .close_prices(&config.trading.symbol, "1m", config.risk.window)
        .await
    {
        Ok(closes) => {
            if let (Some(paper), Some(last)) = (&paper, closes.last()) {
                paper.set_price(*last);
            }
            engine.seed_window(&closes);
        }
        Err(e) => tracing::warn!(error = %e, "window seeding skipped"),
    }

    let listener = FeedListener::new(
        config.binance.stream_url(&config.trading.symbol),
        BackoffPolicy::from_config(&config.feed),
        notifier.clone(),
    );

    let handler: Arc<dyn TickHandler> = engine;
    let feed_task = tokio::spawn(async move {
        listener.run(handler).await;
    });

    feed_task.await?;
    Ok(())
}

async fn show_price(config: Config) -> anyhow::Result<()> {
    let client = BinanceFutures::new(&config.binance)?;
    let symbol = &config.trading.symbol;

    let ticker = client.ticker_price(symbol).await?;
    let mark = client.mark_price(symbol).await?;

    println!("{symbol}");
    println!("  last: {ticker}");
    println!("  mark: {mark}");
    Ok(())
}

fn show_risk(config: Config, entry: Decimal, volatility: Decimal) -> anyhow::Result<()> {
    let calculator = RiskCalculator::from_config(&config.risk);
    let params = calculator.calculate(entry, volatility)?;

    println!("entry {entry} @ volatility {volatility}");
    println!("  leverage:    {}x", params.leverage);
    println!("  stop-loss:   {}", params.stop_loss_price);
    println!("  take-profit: {}", params.take_profit_price);
    Ok(())
}

async fn simulate(config: Config, paths: usize, horizon: usize) -> anyhow::Result<()> {
    let client = BinanceFutures::new(&config.binance)?;
    let closes = client
        .close_prices(&config.trading.symbol, "1h", 100)
        .await?;

    let report = MonteCarlo::new(paths, horizon).simulate(&closes, &mut rand::rng())?;

    println!("{} over {horizon} candles ({paths} paths)", config.trading.symbol);
    println!("  expected: {}", report.expected_price);
    println!("  5% bound: {}", report.lower_bound);
    println!("  95% bound: {}", report.upper_bound);
    println!("  VaR(95):  {}", report.var_95);
    Ok(())
}

async fn show_status(config: Config) -> anyhow::Result<()> {
    let client = BinanceFutures::new(&config.binance)?;
    let positions = client.open_positions().await?;

    if positions.is_empty() {
        println!("no open positions");
        return Ok(());
    }

    for p in positions {
        println!(
            "{}: {} @ {} ({}x, uPnL {})",
            p.symbol, p.amount, p.entry_price, p.leverage, p.unrealized_pnl
        );
    }
    Ok(())
}

async fn close_position(config: Config, symbol: Option<String>) -> anyhow::Result<()> {
    let client = BinanceFutures::new(&config.binance)?;
    let symbol = symbol.unwrap_or_else(|| config.trading.symbol.clone());

    match client.close_position(&symbol).await? {
        Some(ack) => println!("closed {} ({} {})", symbol, ack.side.as_str(), ack.quantity),
        None => println!("no open position for {symbol}"),
    }
    Ok(())
}

async fn send_report(config: Config) -> anyhow::Result<()> {
    let client = BinanceFutures::new(&config.binance)?;
    let notifier = Notifier::from_config(&config.telegram);

    let positions = client.open_positions().await?;
    let profit: Decimal = positions
        .iter()
        .filter(|p| p.unrealized_pnl > Decimal::ZERO)
        .map(|p| p.unrealized_pnl)
        .sum();
    let loss: Decimal = positions
        .iter()
        .filter(|p| p.unrealized_pnl < Decimal::ZERO)
        .map(|p| -p.unrealized_pnl)
        .sum();

    notifier.daily_report(profit, loss, positions.len()).await;
    println!(
        "report sent: {} positions, +{profit} / -{loss}",
        positions.len()
    );
    Ok(())
}

async fn test_notify(config: Config) -> anyhow::Result<()> {
    if config.telegram.is_none() {
        anyhow::bail!("telegram is not configured");
    }

    let notifier = Notifier::from_config(&config.telegram);
    notifier.send("✅ Telegram channel is working").await;
    println!("test notification sent");
    Ok(())
}
