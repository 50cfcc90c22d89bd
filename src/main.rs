use std::process::ExitCode;

use moexbot::api::MoexIssClient;
use moexbot::broker::SimulatedBroker;
use moexbot::config::Settings;
use moexbot::engine::ExecutionEngine;
use moexbot::error::EngineError;
use moexbot::report::{AdminApiSink, EventSink, NullSink};
use moexbot::strategy::{CloseAboveOpen, Strategy};
use moexbot::stream::CandleStream;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    setup_logging();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Bad configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let strategy = Box::new(CloseAboveOpen);

    tracing::info!("moexbot starting");
    tracing::info!("  Instrument: {}", settings.instrument);
    tracing::info!("  Period: {} min", settings.period_minutes);
    tracing::info!("  Quantity: {}", settings.quantity);
    tracing::info!("  Balance: {:.2}", settings.initial_balance);
    tracing::info!("  Strategy: {}", strategy.name());

    let sink = build_sink(&settings, strategy.name()).await;
    let client = MoexIssClient::new(settings.iss_base_url.clone());
    let stream = CandleStream::new(client, settings.instrument.clone(), settings.period_minutes);
    let broker = SimulatedBroker::new(settings.initial_balance);
    let engine = ExecutionEngine::new(
        settings.instrument.clone(),
        settings.quantity,
        broker,
        strategy,
        sink,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut engine_task = tokio::spawn(engine.run(stream, shutdown_rx));

    let result = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
            let _ = shutdown_tx.send(true);
            (&mut engine_task).await
        }
        result = &mut engine_task => result,
    };

    match result {
        Ok(Ok(())) => {
            tracing::info!("moexbot stopped");
            ExitCode::SUCCESS
        }
        Ok(Err(e @ EngineError::DataSource(_))) => {
            tracing::error!("{}", e);
            ExitCode::from(1)
        }
        Ok(Err(e @ EngineError::BalanceExhausted { .. })) => {
            tracing::error!("{}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!("Engine task failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moexbot=info".into()),
        )
        .init();
}

/// Admin reporting is an observability side effect: a missing or broken
/// admin service degrades to warnings, never blocks trading.
async fn build_sink(settings: &Settings, strategy_name: &str) -> Box<dyn EventSink> {
    let Some(base_url) = &settings.admin_base_url else {
        tracing::info!("Admin reporting disabled");
        return Box::new(NullSink);
    };

    let mut sink = AdminApiSink::new(base_url.clone());
    match sink.register_strategy(strategy_name, "Live trading run").await {
        Ok(id) => tracing::info!("Registered strategy {} as {}", strategy_name, id),
        Err(e) => tracing::warn!(
            "Strategy registration failed ({}), records will carry no strategy id",
            e
        ),
    }
    Box::new(sink)
}
