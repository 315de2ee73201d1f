use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vn30_sentinel::routers::{create_routes, normalize_tickers};
use vn30_sentinel::{
    load_config, AnalysisEvent, AnalysisOrchestrator, AppState, GeminiClient, ResultsHolder,
};

fn init_tracing(log_dir: Option<&str>) -> Option<WorkerGuard> {
    // Настройка структурированного логирования
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vn30_sentinel=info,warn"));

    // Дополнительно пишем JSON-логи в файл с ежедневной ротацией
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "vn30_sentinel.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer().json().with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true))
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    let _log_guard = init_tracing(config.log_dir.as_deref());

    let client = GeminiClient::new(config.clone())?;
    let orchestrator = AnalysisOrchestrator::new(Arc::new(client));

    // Тикеры в аргументах - разовый прогон в терминале вместо HTTP сервера
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        let tickers = normalize_tickers(&args, config.max_tickers())?;
        let mut events = orchestrator.spawn(tickers);
        while let Some(event) = events.recv().await {
            match event {
                AnalysisEvent::Result(result) => println!("{}", serde_json::to_string(&result)?),
                AnalysisEvent::Progress(progress) => {
                    tracing::info!("Прогресс: {:.0}%", progress * 100.0)
                }
            }
        }
        return Ok(());
    }

    let state = AppState {
        orchestrator,
        results: ResultsHolder::new(),
        config: config.clone(),
    };

    let app = create_routes(state);
    println!("Сервер запущен на http://{}", config.bind_address());
    axum::Server::bind(&config.bind_address().parse()?)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
