use std::{process, sync::Arc};

use folio::{
    application::{error::AppError, remote::PostsApi},
    cache::{CacheConfig, ReadCache},
    config,
    infra::{
        api_client::RemotePostsApi,
        cache_warmer::CacheWarmer,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
    presentation::views::LayoutChrome,
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let api: Arc<dyn PostsApi> = Arc::new(RemotePostsApi::new(
        &settings.api.base_url,
        settings.api.user_agent.as_deref(),
    )?);

    let cache_config = CacheConfig::from(&settings.cache);
    let cache = cache_config
        .enabled
        .then(|| Arc::new(ReadCache::new(&cache_config)));

    let state = HttpState::assemble(api, cache.clone(), LayoutChrome::for_site(&settings.site.title));

    if cache.is_some() && cache_config.warm_on_startup {
        spawn_cache_warmup(&state, cache_config.warm_concurrency());
    }

    serve_http(&settings, state).await
}

/// Warm in the background; a failed warmup leaves the cache cold, nothing more.
fn spawn_cache_warmup(state: &HttpState, concurrency: usize) {
    let warmer = CacheWarmer::new(state.reads.clone(), concurrency);
    tokio::spawn(async move {
        if let Err(err) = warmer.warm_initial().await {
            warn!(target: "folio::cache_warmer", error = %err, "cache warmup failed");
        }
    });
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let addr = settings.server.public_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::from(InfraError::bind(addr, err)))?;

    info!(
        target: "folio::serve",
        addr = %addr,
        api = %settings.api.base_url,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(target: "folio::serve", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(target: "folio::serve", "shutdown signal received");
}
