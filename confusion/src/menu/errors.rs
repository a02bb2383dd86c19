//! Menu error types.

use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum MenuError {
    /// Store error (query failure or timeout)
    #[error("Store error: {0}")]
    Store(StoreError),

    /// Target row (or a row it references) does not exist
    #[error("No such {0}")]
    NotFound(String),

    /// Partial update carried no fields
    #[error("Nothing to update")]
    EmptyUpdate,

    /// Update would duplicate a unique name
    #[error("Update conflicts with an existing entry")]
    UpdateConflict,

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i32),

    /// Requester is not the comment's author
    #[error("You are not the author of this comment")]
    NotOwner,
}

impl From<StoreError> for MenuError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingReference(what) => MenuError::NotFound(what),
            other => MenuError::Store(other),
        }
    }
}

impl MenuError {
    /// Client-facing message; store internals are never exposed
    pub fn client_message(&self) -> String {
        match self {
            MenuError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type MenuResult<T> = Result<T, MenuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_reference_becomes_not_found() {
        let err = MenuError::from(StoreError::MissingReference("dish".to_string()));
        assert!(matches!(err, MenuError::NotFound(ref what) if what == "dish"));
    }

    #[test]
    fn test_store_details_hidden() {
        let err = MenuError::from(StoreError::Conflict("dish name".to_string()));
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_rating_message() {
        assert_eq!(
            MenuError::InvalidRating(9).to_string(),
            "Rating must be between 1 and 5, got 9"
        );
    }
}
