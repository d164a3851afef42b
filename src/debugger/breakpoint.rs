use crate::debugger::utils::null_as_default;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Breakpoint at a single line of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBreakpoint {
    pub line: i64,
    /// Identifier supplied by the verifier, empty for not yet verified breakpoints.
    #[serde(default)]
    pub id: String,
}

impl PageBreakpoint {
    pub fn new(line: i64, id: impl Into<String>) -> Self {
        Self {
            line,
            id: id.into(),
        }
    }
}

/// Breakpoints of one page, element of the breakpoints verification exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBreakpoints {
    pub page: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub breakpoints: Vec<PageBreakpoint>,
}

/// Breakpoint set on the wire: page -> stringified line -> true.
pub type LineIndex = BTreeMap<String, BTreeMap<String, bool>>;

/// Breakpoints grouped by page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BreakpointSet(BTreeMap<String, Vec<PageBreakpoint>>);

impl BreakpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, page: &str) -> Option<&[PageBreakpoint]> {
        self.0.get(page).map(Vec::as_slice)
    }

    /// Replace breakpoints of every page mentioned in `pages`, other pages stay untouched.
    pub fn merge(&mut self, pages: Vec<PageBreakpoints>) {
        for page in pages {
            self.0.insert(page.page, page.breakpoints);
        }
    }

    /// Return breakpoints as a list of pages (same shape as a verification request).
    pub fn to_pages(&self) -> Vec<PageBreakpoints> {
        self.0
            .iter()
            .map(|(page, breakpoints)| PageBreakpoints {
                page: page.clone(),
                breakpoints: breakpoints.clone(),
            })
            .collect_vec()
    }

    /// Build a membership map used by pages to test whether a line has a breakpoint.
    pub fn line_index(&self) -> LineIndex {
        self.0
            .iter()
            .map(|(page, breakpoints)| {
                let lines = breakpoints
                    .iter()
                    .map(|bp| (bp.line.to_string(), true))
                    .collect();
                (page.clone(), lines)
            })
            .collect()
    }

    /// Human readable dump, one line per page.
    pub fn dump(&self) -> String {
        self.0
            .iter()
            .map(|(page, breakpoints)| {
                let lines = breakpoints
                    .iter()
                    .map(|bp| format!("{}({})", bp.line, bp.id))
                    .join(" ");
                format!("{page}: {lines}\n")
            })
            .collect()
    }
}

impl From<Vec<PageBreakpoints>> for BreakpointSet {
    fn from(pages: Vec<PageBreakpoints>) -> Self {
        let mut set = BreakpointSet::new();
        set.merge(pages);
        set
    }
}
