// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per storage entity.

pub mod messages;
pub mod presence;
pub mod tasks;
pub mod users;

use rusqlite::types::Type;

/// Parse a TEXT column into a `FromStr` type, mapping parse failures into
/// a rusqlite conversion error so they surface through the usual channel.
pub(crate) fn text_col<T>(idx: usize, value: String) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
