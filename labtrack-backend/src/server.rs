use std::sync::Arc;

use anyhow::Context;
use axum::{Router, routing::get};
use camino::Utf8PathBuf;
use diesel_async::{
    AsyncPgConnection,
    async_connection_wrapper::AsyncConnectionWrapper,
    pooled_connection::{
        AsyncDieselConnectionManager,
        deadpool::{Object, Pool},
    },
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use util::DevContainer;

use crate::{config::Config, db};

mod api;
pub mod util;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../db/migrations");

/// # Errors
pub async fn serve(mut config: Config, log_dir: Option<Utf8PathBuf>) -> anyhow::Result<()> {
    initialize_logging(log_dir);

    config
        .read_secrets()
        .context("failed to read secrets directory")?;
    let app_addr = config.app_address();

    let app_state = AppState::new(&config)
        .await
        .context("failed to initialize app state")?;
    tracing::info!("initialized app state");

    let db_conn = app_state
        .db_conn()
        .await
        .context("failed to connect to database")?;
    run_migrations(db_conn)
        .await
        .context("failed to run database migrations")?;
    tracing::info!("ran database migrations");

    if let Some(seed_data) = config.seed_data()? {
        let mut db_conn = app_state.db_conn().await?;
        seed_data
            .write(&mut db_conn)
            .await
            .context("failed to insert seed data")?;
        tracing::info!("inserted seed data");
    }

    let app = app(app_state.clone());

    let listener = TcpListener::bind(&app_addr)
        .await
        .with_context(|| format!("failed to listen on {app_addr}"))?;
    tracing::info!("labtrack listening on {app_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(app_state))
        .await
        .context("failed to serve app")?;

    Ok(())
}

fn initialize_logging(log_dir: Option<Utf8PathBuf>) {
    use tracing::Level;
    use tracing_subscriber::{filter::Targets, prelude::*};

    let log_layer = tracing_subscriber::fmt::layer();

    match log_dir {
        None => {
            let dev_log_filter = Targets::new()
                .with_target("labtrack_backend", Level::DEBUG)
                .with_target("tower_http", Level::TRACE);
            let log_layer = log_layer.pretty().with_filter(dev_log_filter);

            // A second call (as in tests that start several servers) is harmless
            tracing_subscriber::registry().with(log_layer).try_init().ok();
        }
        Some(path) => {
            let log_writer = tracing_appender::rolling::daily(path, "labtrack.log");
            let prod_log_filter = Targets::new()
                .with_target("labtrack_backend", Level::INFO)
                .with_target("tower_http", Level::INFO);
            let log_layer = log_layer
                .json()
                .with_writer(log_writer)
                .with_filter(prod_log_filter);

            tracing_subscriber::registry().with(log_layer).try_init().ok();
        }
    }
}

#[derive(Clone)]
pub(crate) enum AppState {
    Dev {
        db_pool: Pool<AsyncPgConnection>,
        _pg_container: Arc<DevContainer>,
    },
    Prod {
        db_pool: Pool<AsyncPgConnection>,
    },
}

impl AppState {
    async fn new(config: &Config) -> anyhow::Result<Self> {
        let state = if config.is_dev() {
            let pg_container = DevContainer::new("labtrack-backend_dev", false)
                .await
                .context("failed to start postgres container instance")?;

            let db_config =
                AsyncDieselConnectionManager::<AsyncPgConnection>::new(pg_container.db_url().await?);
            let db_pool = Pool::builder(db_config).build()?;

            Self::Dev {
                db_pool,
                _pg_container: Arc::new(pg_container),
            }
        } else {
            let db_config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.db_url());
            let db_pool = Pool::builder(db_config).build()?;

            Self::Prod { db_pool }
        };

        Ok(state)
    }

    /// Wraps an existing pool, for exercising the router without a container.
    #[cfg(test)]
    pub(crate) fn from_pool(db_pool: Pool<AsyncPgConnection>) -> Self {
        Self::Prod { db_pool }
    }

    pub(crate) async fn db_conn(&self) -> db::error::Result<Object<AsyncPgConnection>> {
        use AppState::{Dev, Prod};

        match self {
            Dev { db_pool, .. } | Prod { db_pool } => Ok(db_pool.get().await?),
        }
    }
}

pub(crate) async fn run_migrations(db_conn: Object<AsyncPgConnection>) -> anyhow::Result<()> {
    let mut wrapper: AsyncConnectionWrapper<Object<AsyncPgConnection>> =
        AsyncConnectionWrapper::from(db_conn);

    tokio::task::spawn_blocking(move || {
        wrapper
            .run_pending_migrations(MIGRATIONS)
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!(e))
    })
    .await??;

    Ok(())
}

pub(crate) fn app(app_state: AppState) -> Router {
    api::router()
        .route("/health", get(async || ()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn shutdown_signal(app_state: AppState) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutting down");
    drop(app_state);
}
