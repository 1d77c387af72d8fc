//! Column decoding helpers shared by the row mappers.

use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use opsflow_domain::time::{self, Timestamp};

/// Storage format of calendar dates.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn decode_error<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}

/// Parse a text column with `FromStr` (ids, statuses).
pub(crate) fn parsed<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(decode_error)
}

pub(crate) fn parsed_opt<T>(row: &SqliteRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|value| value.parse().map_err(decode_error))
        .transpose()
}

pub(crate) fn timestamp(row: &SqliteRow, column: &str) -> Result<Timestamp, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    time::from_storage(&raw).map_err(decode_error)
}

pub(crate) fn timestamp_opt(row: &SqliteRow, column: &str) -> Result<Option<Timestamp>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|value| time::from_storage(&value).map_err(decode_error))
        .transpose()
}

pub(crate) fn date_opt(row: &SqliteRow, column: &str) -> Result<Option<NaiveDate>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|value| NaiveDate::parse_from_str(&value, DATE_FORMAT).map_err(decode_error))
        .transpose()
}

pub(crate) fn date_to_storage(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `?, ?, ?` with one placeholder per value.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
