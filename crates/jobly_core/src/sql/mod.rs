//! Query-fragment compiler for loosely-typed client input.
//!
//! # Responsibility
//! - Turn query-string filters into WHERE-clause fragments (`filter`).
//! - Turn partial update payloads into SET-clause fragments (`partial_update`).
//!
//! # Invariants
//! - Fragment text is built only from static column names and placeholder
//!   indices. Caller values reach SQLite exclusively through bound params.
//! - The Nth `?N` placeholder binds the Nth element of the param list.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod filter;
pub mod partial_update;

pub use filter::{
    compile_filters, CompiledPredicate, FilterField, FilterMode, FilterRequest, ValueKind,
};
pub use partial_update::{
    sql_for_partial_update, CompiledAssignment, FieldTranslationTable, UpdatePayload,
};

/// Rejections raised while compiling caller input into SQL fragments.
///
/// Every variant is a client fault and is detected before any store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Partial update payload carried no fields.
    NoData,
    /// Raw filter value could not be coerced to the field's declared kind.
    InvalidFilterValue { filter: &'static str, value: String },
    /// A minimum filter exceeds the maximum filter on the same column.
    InvertedRange {
        min_filter: &'static str,
        max_filter: &'static str,
    },
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoData => write!(f, "no data"),
            Self::InvalidFilterValue { filter, value } => {
                write!(f, "invalid value `{value}` for filter `{filter}`")
            }
            Self::InvertedRange {
                min_filter,
                max_filter,
            } => write!(f, "`{min_filter}` must not be greater than `{max_filter}`"),
        }
    }
}

impl Error for QueryError {}

/// SQL scalar function lowercasing text with Unicode rules.
///
/// SQLite's own `LIKE`/`lower` fold ASCII only.
pub const CASEFOLD_FN: &str = "casefold";

/// Registers `CASEFOLD_FN` on `conn`; compiled `Contains` fragments call it.
pub fn register_casefold(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        CASEFOLD_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text = ctx.get::<Option<String>>(0)?;
            Ok(text.map(|text| text.to_lowercase()))
        },
    )
}

/// Quotes a column identifier, doubling any embedded quote.
pub(crate) fn quote_column(column: &str) -> String {
    format!("\"{}\"", column.replace('"', "\"\""))
}
