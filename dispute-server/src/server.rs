use {
    crate::{
        api,
        api::ws::WsState,
        config::{
            Config,
            RunOptions,
        },
        session::service::Service,
        state::Store,
    },
    anyhow::anyhow,
    sqlx::postgres::PgPoolOptions,
    std::{
        sync::{
            atomic::{
                AtomicBool,
                Ordering,
            },
            Arc,
        },
        time::Duration,
    },
};

const DATABASE_MAX_CONNECTIONS: u32 = 10;

pub async fn start_server(run_options: RunOptions) -> anyhow::Result<()> {
    tokio::spawn(async move {
        tracing::info!("Registered shutdown signal handler...");
        tokio::signal::ctrl_c().await.unwrap();
        tracing::info!("Shut down signal received, waiting for tasks...");
        SHOULD_EXIT.store(true, Ordering::Release);
    });

    let config = Config::load(&run_options.config.config).map_err(|err| {
        anyhow!(
            "Failed to load config from file({path}): {:?}",
            err,
            path = run_options.config.config
        )
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(DATABASE_MAX_CONNECTIONS)
        .connect(&run_options.server.database_url)
        .await
        .map_err(|err| anyhow!("Failed to connect to the database: {:?}", err))?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let sessions = Service::new(pool, config.dispute);
    let task_tracker = sessions.task_tracker().clone();
    let store = Arc::new(Store {
        sessions,
        ws: WsState::new(run_options.server.requester_ip_header_name.clone()),
        admin_key: run_options.server.admin_key.clone(),
    });

    api::start_api(run_options, store).await?;

    // start_api returning dropped the store and with it every session's
    // command sender; the workers drain their queues and stop.
    task_tracker.close();
    task_tracker.wait().await;
    Ok(())
}

// A static exit flag to indicate to running threads that we're shutting down. This is used to
// gracefully shutdown the application.
//
// NOTE: A more idiomatic approach would be to use a tokio::sync::broadcast channel, and to send a
// shutdown signal to all running tasks. However, this is a bit more complicated to implement and
// we don't rely on global state for anything else.
pub(crate) static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);
pub const EXIT_CHECK_INTERVAL: Duration = Duration::from_secs(1);
