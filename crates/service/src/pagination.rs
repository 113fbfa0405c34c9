//! Pagination utilities for service layer
//!
//! List endpoints take `limit`/`offset`; a zero or absent limit returns every row.

use sea_orm::QuerySelect;
use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct Pagination {
    /// max rows; `None` or 0 means unbounded
    pub limit: Option<u64>,
    /// rows to skip
    pub offset: Option<u64>,
}

impl Pagination {
    /// Resolve to `(limit, offset)` for the query builder. Zero values are
    /// dropped; an offset without a limit gets an unbounded limit, since
    /// SQLite rejects a bare `OFFSET`.
    pub fn normalize(self) -> (Option<u64>, Option<u64>) {
        let limit = self.limit.filter(|l| *l > 0);
        let offset = self.offset.filter(|o| *o > 0);
        match (limit, offset) {
            (None, Some(_)) => (Some(i64::MAX as u64), offset),
            _ => (limit, offset),
        }
    }

    pub fn apply<S: QuerySelect>(self, select: S) -> S {
        let (limit, offset) = self.normalize();
        select.limit(limit).offset(offset)
    }
}

/// Paging and ordering parameters of a list request.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// `"<field>_<ASC|DESC>"`
    pub order_by: Option<String>,
}

impl ListParams {
    pub fn pagination(&self) -> Pagination {
        Pagination { limit: self.limit, offset: self.offset }
    }
}

/// Entity filter plus paging for `find_and_count_all`.
#[derive(Clone, Debug, Default)]
pub struct ListQuery<F> {
    pub filter: F,
    pub params: ListParams,
}

/// `{ rows, count }` list response; `count` ignores pagination.
#[derive(Clone, Debug, Serialize)]
pub struct FindAndCountAll<T> {
    pub rows: Vec<T>,
    pub count: u64,
}

/// Entry returned by autocomplete endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteItem {
    pub id: String,
    pub label: String,
}
