//! The category name shared by transactions and budgets.
//!
//! Budgets are matched to transactions by comparing category names, so both
//! sides go through the same normalisation.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::Serialize;

use crate::Error;

/// The maximum number of characters in a category name.
pub const MAX_CATEGORY_LENGTH: usize = 50;

/// A validated, non-empty category name, e.g. "Food" or "Salary".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an [Error::EmptyCategory] if `name` is blank, or an
    /// [Error::CategoryTooLong] if it has more than [MAX_CATEGORY_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategory)
        } else if name.chars().count() > MAX_CATEGORY_LENGTH {
            Err(Error::CategoryTooLong)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for CategoryName {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl FromSql for CategoryName {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Self)
    }
}
