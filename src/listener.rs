//! Consumer of stop notifications emitted by pages into a PostgreSQL notification channel.

use crate::debugger::Debugger;
use crate::queue::QueueError;
use crate::weak_error;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_postgres::{AsyncMessage, Client};

pub const DEFAULT_CHANNEL: &str = "queue_debugger";
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(60);
pub const DEFAULT_MIN_RECONNECT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_RECONNECT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct ListenerConfig {
    /// Notification channel name.
    pub channel: String,
    /// Silence period after which the connection is pinged.
    pub keepalive: Duration,
    pub min_reconnect: Duration,
    pub max_reconnect: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_string(),
            keepalive: DEFAULT_KEEPALIVE,
            min_reconnect: DEFAULT_MIN_RECONNECT,
            max_reconnect: DEFAULT_MAX_RECONNECT,
        }
    }
}

/// Exponential delay between reconnection attempts.
#[derive(Debug)]
pub struct Backoff {
    min: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
            current: min,
        }
    }

    /// Return delay before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.min;
    }
}

/// Long-lived subscription to the debugger notification channel.
pub struct NotificationListener {
    conn_str: String,
    config: ListenerConfig,
    debugger: Arc<Debugger>,
}

impl NotificationListener {
    pub fn new(
        conn_str: impl Into<String>,
        config: ListenerConfig,
        debugger: Arc<Debugger>,
    ) -> Self {
        Self {
            conn_str: conn_str.into(),
            config,
            debugger,
        }
    }

    /// Open a dedicated connection, subscribe to the channel and forward its payloads.
    async fn subscribe(
        &self,
    ) -> Result<(Arc<Client>, mpsc::UnboundedReceiver<String>), QueueError> {
        let (client, mut connection) =
            tokio_postgres::connect(&self.conn_str, tokio_postgres::NoTls).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let channel = self.config.channel.clone();
        tokio::spawn(async move {
            while let Some(message) =
                std::future::poll_fn(|cx| connection.poll_message(cx)).await
            {
                match message {
                    Ok(AsyncMessage::Notification(n)) if n.channel() == channel => {
                        if tx.send(n.payload().to_string()).is_err() {
                            break;
                        }
                    }
                    Ok(AsyncMessage::Notice(notice)) => {
                        debug!(target: "listener", "database notice: {notice}");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(target: "listener", "notification connection: {e}");
                        break;
                    }
                }
            }
        });

        client
            .batch_execute(&format!("LISTEN \"{}\"", self.config.channel))
            .await?;

        Ok((Arc::new(client), rx))
    }

    /// Listen forever, reconnecting with backoff when the connection is lost.
    pub async fn run(self) {
        let mut backoff = Backoff::new(self.config.min_reconnect, self.config.max_reconnect);

        loop {
            match self.subscribe().await {
                Ok((client, mut rx)) => {
                    backoff.reset();
                    info!(
                        target: "listener",
                        "listening for database notifications from debugger queue ({})",
                        self.config.channel
                    );

                    pump(&self.debugger, &mut rx, self.config.keepalive, || {
                        let client = client.clone();
                        tokio::spawn(async move {
                            weak_error!(client.simple_query("SELECT 1").await, "listener ping:");
                        });
                    })
                    .await;

                    warn!(target: "listener", "notification channel closed");
                }
                Err(e) => warn!(target: "listener", "subscribe to notifications: {e:#}"),
            }

            let delay = backoff.next_delay();
            info!(target: "listener", "reconnect in {}s", delay.as_secs());
            tokio::time::sleep(delay).await;
        }
    }
}

/// Dispatch payloads from `rx` to the debugger until the channel closes.
///
/// Each payload is handled in its own task, so a slow database lookup never holds the loop back.
/// `ping` is called after `keepalive` of silence. In-flight handlers are awaited before return.
pub async fn pump(
    debugger: &Arc<Debugger>,
    rx: &mut mpsc::UnboundedReceiver<String>,
    keepalive: Duration,
    mut ping: impl FnMut(),
) {
    let mut handlers = JoinSet::new();
    let silence = tokio::time::sleep(keepalive);
    tokio::pin!(silence);

    loop {
        tokio::select! {
            payload = rx.recv() => {
                let Some(payload) = payload else {
                    break;
                };
                silence.as_mut().reset(Instant::now() + keepalive);
                let debugger = debugger.clone();
                handlers.spawn(async move {
                    weak_error!(
                        debugger.on_notification(&payload).await,
                        "stop notification dropped:"
                    );
                });
            }
            Some(_) = handlers.join_next(), if !handlers.is_empty() => {}
            () = &mut silence => {
                debug!(target: "listener", "pinging debugger listener");
                ping();
                silence.as_mut().reset(Instant::now() + keepalive);
            }
        }
    }

    while handlers.join_next().await.is_some() {}
}
