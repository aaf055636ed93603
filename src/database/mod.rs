pub mod db;
pub mod memory;

pub use db::connect_to_mongo;
pub use memory::{MemoryBlogStore, MemoryUserStore};

use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Failures surfaced by the persistence adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index rejected the write. Carries the offending field name when known.
    #[error("duplicate key on {0}")]
    DuplicateKey(String),

    #[error("database error: {0}")]
    Database(#[source] mongodb::error::Error),
}

impl StoreError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey(_))
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        let duplicate_message = match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write_error))
                if write_error.code == DUPLICATE_KEY_CODE =>
            {
                Some(write_error.message.clone())
            }
            ErrorKind::Command(command_error) if command_error.code == DUPLICATE_KEY_CODE => {
                Some(command_error.message.clone())
            }
            _ => None,
        };

        match duplicate_message {
            Some(message) => StoreError::DuplicateKey(duplicate_field(&message)),
            None => StoreError::Database(err),
        }
    }
}

/// Pulls the field name out of a server message such as
/// `E11000 duplicate key error collection: db.blogs index: title_1 dup key: { title: "x" }`.
fn duplicate_field(message: &str) -> String {
    message
        .split("index: ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .map(|index| index.trim_end_matches(|c: char| c == '_' || c.is_ascii_digit()))
        .filter(|field| !field.is_empty())
        .unwrap_or("key")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_field_reads_the_index_name() {
        let message = "E11000 duplicate key error collection: blogging_api.blogs index: title_1 dup key: { title: \"Hello\" }";
        assert_eq!(duplicate_field(message), "title");
    }

    #[test]
    fn duplicate_field_falls_back_when_unparseable() {
        assert_eq!(duplicate_field("E11000 duplicate key error"), "key");
    }
}
