use std::sync::Arc;

use anyhow::Context;
use evlog::{meta, LogEventConsolePrinter, Logger};
use survey_api::config::{Config, StoreKind};
use survey_api::db::dbclient::DBClient;
use survey_api::db::memory::MemoryStore;
use survey_api::db::Store;
use survey_api::handler::ShareData;
use survey_api::runtime::{get_logger, set_logger};
use tokio::net::TcpListener;
use tokio::signal;

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    match config.store {
        StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreKind::Postgres => {
            let db_url = config.database_url.as_deref().context("expected SURVEYS_DATABASE_URL")?;

            let db_client = DBClient::new(db_url, config.max_connections).await
                .context("failed to connect to database")?;

            if config.apply_schema {
                db_client.apply_schema().await.context("failed to apply database schema")?;
                get_logger().info("Applied database schema.", meta! {
                    "MaxConnections" => config.max_connections,
                });
            }

            Ok(Arc::new(db_client))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            get_logger().error("Failed to listen for Ctrl-C.", meta! {
                "Error" => e,
            });
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                get_logger().error("Failed to listen for SIGTERM.", meta! {
                    "Error" => e,
                });
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    get_logger().info("Shutting down.", meta! {
        "Reason" => "signal",
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the variables may come from the environment.
    dotenv::dotenv().ok();

    let mut logger = Logger::default();
    logger.register(LogEventConsolePrinter::default());
    set_logger(logger);

    let config = Config::from_env()?;

    get_logger().info("Loaded configuration.", meta! {
        "Bind" => config.bind,
        "Store" => format!("{:?}", config.store),
        "MaxConnections" => config.max_connections,
        "ApplySchema" => config.apply_schema,
    });

    let store = open_store(&config).await?;
    let app = survey_api::app(ShareData::new(store));

    let listener = TcpListener::bind(config.bind).await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    get_logger().info("Listening.", meta! {
        "Address" => config.bind,
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
