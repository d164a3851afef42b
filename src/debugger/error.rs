use crate::queue::QueueError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --------------------------------- payload errors --------------------------------------------
    #[error("malformed stop notification: {0}")]
    MalformedNotification(serde_json::Error),
    #[error("stop notification without a queue hash")]
    MissingHash,
    #[error("malformed debugger request for queue row {hash}: {source}")]
    MalformedRequest {
        hash: String,
        source: serde_json::Error,
    },
    #[error("malformed breakpoints request: {0}")]
    MalformedBreakpoints(serde_json::Error),
    #[error("malformed verification response: {0}")]
    MalformedVerification(serde_json::Error),
    #[error("thread id `{0}` is not a number")]
    InvalidThreadId(String),

    // --------------------------------- database errors -------------------------------------------
    #[error(transparent)]
    Queue(#[from] QueueError),

    // --------------------------------- serialization errors --------------------------------------
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[macro_export]
macro_rules! _error {
    ($log_fn: path, $res: expr) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "debugger", "{:#}", e);
                None
            }
        }
    };
    ($log_fn: path, $res: expr, $msg: tt) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "debugger", concat!($msg, " {:#}"), e);
                None
            }
        }
    };
}

/// Transforms `Result` into `Option` and logs an error if it occurs.
#[macro_export]
macro_rules! weak_error {
    ($res: expr) => {
        $crate::_error!(log::warn, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::warn, $res, $msg)
    };
}

/// Transforms `Result` into `Option` and put error into debug logs if it occurs.
#[macro_export]
macro_rules! muted_error {
    ($res: expr) => {
        $crate::_error!(log::debug, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::debug, $res, $msg)
    };
}
