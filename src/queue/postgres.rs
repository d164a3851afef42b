use crate::queue::{DebuggerQueue, QueueError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::{Client, NoTls};

const FETCH_REQUEST: &str = "SELECT request FROM __pogo_debugger_queue WHERE id = $1";
const RESPOND: &str = "UPDATE __pogo_debugger_queue SET response = $1 WHERE id = $2";
const IS_PENDING: &str =
    "SELECT count(1) FROM __pogo_debugger_queue WHERE id = $1 AND response IS NULL";
const VERIFY: &str = "SELECT __pogo_break_points_verify($1)";
const INSTALL: &str = "SELECT __pogo_break_points_set($1)";

/// Open a connection and drive it in a background task.
pub(crate) async fn connect(conn_str: &str) -> Result<Client, tokio_postgres::Error> {
    let (client, connection) = tokio_postgres::connect(conn_str, NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::warn!(target: "debugger", "database connection closed: {e}");
        }
    });
    Ok(client)
}

/// Debugger queue backed by a PostgreSQL connection.
///
/// Connection is shared by all callers; a closed connection is reopened on the next call.
pub struct PgQueue {
    conn_str: String,
    client: Mutex<Arc<Client>>,
}

impl PgQueue {
    pub async fn connect(conn_str: &str) -> Result<Self, QueueError> {
        let client = connect(conn_str).await?;
        Ok(Self {
            conn_str: conn_str.to_string(),
            client: Mutex::new(Arc::new(client)),
        })
    }

    async fn client(&self) -> Result<Arc<Client>, QueueError> {
        let mut client = self.client.lock().await;
        if client.is_closed() {
            log::info!(target: "debugger", "reconnecting to database");
            *client = Arc::new(connect(&self.conn_str).await?);
        }
        Ok(client.clone())
    }
}

#[async_trait]
impl DebuggerQueue for PgQueue {
    async fn fetch_request(&self, hash: &str) -> Result<Value, QueueError> {
        let client = self.client().await?;
        let row = client
            .query_opt(FETCH_REQUEST, &[&hash])
            .await?
            .ok_or_else(|| QueueError::RowNotFound(hash.to_string()))?;
        Ok(row.try_get::<_, Option<Value>>(0)?.unwrap_or(Value::Null))
    }

    async fn respond(&self, hash: &str, response: &Value) -> Result<(), QueueError> {
        let client = self.client().await?;
        client.execute(RESPOND, &[response, &hash]).await?;
        Ok(())
    }

    async fn is_pending(&self, hash: &str) -> Result<bool, QueueError> {
        let client = self.client().await?;
        let count: i64 = client.query_one(IS_PENDING, &[&hash]).await?.try_get(0)?;
        Ok(count > 0)
    }

    async fn verify_breakpoints(&self, request: &Value) -> Result<Value, QueueError> {
        let client = self.client().await?;
        let row = client.query_one(VERIFY, &[request]).await?;
        Ok(row.try_get::<_, Option<Value>>(0)?.unwrap_or(Value::Null))
    }

    async fn install_breakpoints(&self, breakpoints: &Value) -> Result<(), QueueError> {
        let client = self.client().await?;
        client.execute(INSTALL, &[breakpoints]).await?;
        Ok(())
    }
}
