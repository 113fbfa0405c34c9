//! Query-building helpers shared by the repositories.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, Order, Value};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Parse an id filter. Invalid input becomes a fresh random id, which matches
/// nothing instead of failing the query.
pub fn uuid_or_random(value: &str) -> Uuid {
    Uuid::parse_str(value.trim()).unwrap_or_else(|_| Uuid::new_v4())
}

/// Case-insensitive "contains" match. `%` and `_` in `value` are not escaped.
pub fn ilike<C: ColumnTrait>(column: C, value: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", value.to_lowercase()))
}

pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Inclusive range; either bound may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Range<T> {
    pub start: Option<T>,
    pub end: Option<T>,
}

impl<T: FromStr> Range<T> {
    /// Parse `"start,end"`. Empty bounds are ignored; an unparsable bound is a
    /// validation error.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let (start, end) = raw.split_once(',').unwrap_or((raw, ""));
        Ok(Self { start: parse_bound(start)?, end: parse_bound(end)? })
    }
}

fn parse_bound<T: FromStr>(raw: &str) -> Result<Option<T>, ServiceError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| ServiceError::validation("errors.validation.message"))
}

impl<T: Into<Value> + Clone> Range<T> {
    pub fn apply<C: ColumnTrait>(&self, cond: Condition, column: C) -> Condition {
        let mut cond = cond;
        if let Some(start) = &self.start {
            cond = cond.add(column.gte(start.clone()));
        }
        if let Some(end) = &self.end {
            cond = cond.add(column.lte(end.clone()));
        }
        cond
    }
}

/// Parse an optional range filter and add it to `cond`.
pub fn add_range<T, C>(cond: Condition, column: C, raw: &Option<String>) -> Result<Condition, ServiceError>
where
    T: FromStr + Into<Value> + Clone,
    C: ColumnTrait,
{
    match non_blank(raw) {
        Some(raw) => Ok(Range::<T>::parse(raw)?.apply(cond, column)),
        None => Ok(cond),
    }
}

/// Timestamp bound accepting RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timestamp(pub DateTime<FixedOffset>);

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => Ok(Timestamp(dt)),
            Err(e) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(date) => Ok(Timestamp(date.and_time(chrono::NaiveTime::MIN).and_utc().fixed_offset())),
                Err(_) => Err(e),
            },
        }
    }
}

impl From<Timestamp> for Value {
    fn from(t: Timestamp) -> Self {
        t.0.into()
    }
}

/// Resolve `"<field>_<ASC|DESC>"` against the sortable fields of an entity.
/// Unknown fields or directions fall back to `default`.
pub fn order_by<C: Copy>(raw: Option<&str>, fields: &[(&str, C)], default: (C, Order)) -> (C, Order) {
    let Some((field, direction)) = raw.and_then(|r| r.trim().rsplit_once('_')) else {
        return default;
    };
    let order = match direction.to_ascii_uppercase().as_str() {
        "ASC" => Order::Asc,
        "DESC" => Order::Desc,
        _ => return default,
    };
    match fields.iter().find(|(name, _)| *name == field) {
        Some((_, column)) => (*column, order),
        None => default,
    }
}

pub fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}
