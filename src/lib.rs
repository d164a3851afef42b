pub mod config;
pub mod debugger;
pub mod listener;
pub mod log;
pub mod queue;
pub mod server;

use crate::config::Config;
use crate::debugger::Debugger;
use crate::listener::NotificationListener;
use crate::queue::PgQueue;
use anyhow::Context;
use std::sync::Arc;

/// Start the debugger: connect to the database, listen for stop notifications
/// and serve the HTTP surface until the server fails.
pub async fn start(config: Config) -> anyhow::Result<()> {
    let queue = PgQueue::connect(&config.database_url)
        .await
        .context("connect to database")?;
    let debugger = Arc::new(
        Debugger::new(Arc::new(queue)).with_breakpoints_install(config.install_breakpoints),
    );

    let listener = NotificationListener::new(
        config.database_url.clone(),
        config.listener.clone(),
        debugger.clone(),
    );
    tokio::spawn(listener.run());

    server::serve(config.port, debugger).await
}
