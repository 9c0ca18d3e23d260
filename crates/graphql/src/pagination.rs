//! Cursor pagination over list results.
//!
//! Cursors are offset based and opaque: `base64("arrayconnection:<offset>")`,
//! compatible with Relay's array connections. Unknown or malformed cursors
//! are treated as absent.

use std::future::Future;

use {
    base64::{Engine, engine::general_purpose::STANDARD},
    serde_json::Value,
};

use crate::{
    error::{Error, Result},
    pipeline::InvocationArgs,
};

const CURSOR_PREFIX: &str = "arrayconnection:";

/// Argument names exposed on list-typed operations.
pub const PAGINATION_ARGS: &[&str] = &["first", "after", "last", "before"];

pub fn offset_to_cursor(offset: usize) -> String {
    STANDARD.encode(format!("{CURSOR_PREFIX}{offset}"))
}

pub fn cursor_to_offset(cursor: &str) -> Option<usize> {
    let raw = STANDARD.decode(cursor).ok()?;
    let raw = String::from_utf8(raw).ok()?;
    raw.strip_prefix(CURSOR_PREFIX)?.parse().ok()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionArgs {
    pub first: Option<usize>,
    pub after: Option<String>,
    pub last: Option<usize>,
    pub before: Option<String>,
}

impl ConnectionArgs {
    /// Read the pagination directives from the caller's arguments.
    pub fn from_args(args: &InvocationArgs) -> Result<Self> {
        Ok(Self {
            first: count(args.named.get("first"), "first")?,
            after: cursor(args.named.get("after")),
            last: count(args.named.get("last"), "last")?,
            before: cursor(args.named.get("before")),
        })
    }
}

fn count(value: Option<&Value>, name: &str) -> Result<Option<usize>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => match v.as_i64() {
            Some(n) if n >= 0 => Ok(usize::try_from(n).ok()),
            Some(_) => Err(Error::InvalidPagination(format!(
                "argument \"{name}\" must be a non-negative integer"
            ))),
            None => Err(Error::InvalidPagination(format!(
                "argument \"{name}\" must be an integer"
            ))),
        },
    }
}

fn cursor(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub node: Value,
    pub cursor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connection {
    pub edges: Vec<Edge>,
    pub page_info: PageInfo,
}

/// Slice `items` according to `args`.
///
/// `after`/`before` narrow the window first, then `first` keeps the head of
/// the window and `last` its tail. `has_next_page` and `has_previous_page`
/// report whether any element of `items` lies past either end of the page.
pub fn connection_from_array(items: Vec<Value>, args: &ConnectionArgs) -> Connection {
    let len = items.len();

    let mut start = args
        .after
        .as_deref()
        .and_then(cursor_to_offset)
        .map_or(0, |after| after.saturating_add(1).min(len));
    let mut end = args
        .before
        .as_deref()
        .and_then(cursor_to_offset)
        .map_or(len, |before| before.min(len));
    if end < start {
        end = start;
    }

    if let Some(first) = args.first {
        end = end.min(start.saturating_add(first));
    }
    if let Some(last) = args.last {
        start = start.max(end.saturating_sub(last));
    }

    let edges: Vec<Edge> = items
        .into_iter()
        .enumerate()
        .skip(start)
        .take(end - start)
        .map(|(offset, node)| Edge {
            node,
            cursor: offset_to_cursor(offset),
        })
        .collect();

    let page_info = PageInfo {
        has_next_page: end < len,
        has_previous_page: start > 0,
        start_cursor: edges.first().map(|e| e.cursor.clone()),
        end_cursor: edges.last().map(|e| e.cursor.clone()),
    };

    Connection { edges, page_info }
}

/// Await a list result and page it.
pub async fn connection_from_promised_array<F>(items: F, args: &ConnectionArgs) -> Result<Connection>
where
    F: Future<Output = Result<Vec<Value>>>,
{
    Ok(connection_from_array(items.await?, args))
}
