use crate::debugger::notification::StopNotification;
use crate::debugger::utils::null_as_default;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, RwLock};

/// One frame of a paused thread call stack, as reported by the page executor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadCallFrame {
    pub page: String,
    pub line: i64,
    pub file_name: String,
    /// Frame variables, opaque for the debugger.
    #[serde(deserialize_with = "null_as_default")]
    pub state: BTreeMap<String, serde_json::Value>,
}

/// Paused execution, one per pending debugger queue row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadState {
    pub thread_id: String,
    pub thread_id_int: u64,
    #[serde(rename = "thread_status")]
    pub status: String,
    #[serde(rename = "last_notiffication")]
    pub last_notification: StopNotification,
    #[serde(rename = "notiffication_count")]
    pub notifications_count: u64,
    pub call_stack: Vec<ThreadCallFrame>,
}

#[derive(Default)]
struct Numbers {
    by_id: HashMap<String, u64>,
    by_num: HashMap<u64, String>,
}

/// Maps opaque thread identifiers into small numbers suitable for display and selection.
///
/// Numbers are assigned in first-seen order starting from 1 and never reused.
#[derive(Default)]
pub struct ThreadInterner {
    numbers: RwLock<Numbers>,
    alloc_lock: Mutex<()>,
}

impl ThreadInterner {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&self, thread_id: &str) -> Option<u64> {
        let numbers = self.numbers.read().unwrap_or_else(|e| e.into_inner());
        numbers.by_id.get(thread_id).copied()
    }

    /// Return a number for the thread, allocate a new one if thread is seen for the first time.
    pub fn intern(&self, thread_id: &str) -> u64 {
        if let Some(num) = self.lookup(thread_id) {
            return num;
        }

        let _alloc = self.alloc_lock.lock().unwrap_or_else(|e| e.into_inner());
        // another caller may win the race between lookup and allocation
        if let Some(num) = self.lookup(thread_id) {
            return num;
        }

        let mut numbers = self.numbers.write().unwrap_or_else(|e| e.into_inner());
        let num = numbers.by_id.len() as u64 + 1;
        numbers.by_id.insert(thread_id.to_string(), num);
        numbers.by_num.insert(num, thread_id.to_string());
        num
    }

    /// Return thread identifier by its number.
    pub fn resolve(&self, num: u64) -> Option<String> {
        let numbers = self.numbers.read().unwrap_or_else(|e| e.into_inner());
        numbers.by_num.get(&num).cloned()
    }

    pub fn len(&self) -> usize {
        let numbers = self.numbers.read().unwrap_or_else(|e| e.into_inner());
        numbers.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
