//! Star rating type for book reviews.

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingError {
    /// The value is outside the accepted 1-5 range.
    #[error("rating must be between {min} and {max} stars, got {value}", min = Rating::MIN, max = Rating::MAX)]
    OutOfRange {
        /// The rejected value.
        value: i64,
    },
}

/// A star rating between 1 and 5 inclusive.
///
/// The server enforces the same bounds; validating here blocks a review
/// submission before any request is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    /// Minimum accepted rating.
    pub const MIN: u8 = 1;
    /// Maximum accepted rating.
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values outside 1-5.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] for values outside 1-5.
    pub const fn new(value: u8) -> Result<Self, RatingError> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(RatingError::OutOfRange {
                value: value as i64,
            })
        }
    }

    /// The rating as a number of stars.
    #[must_use]
    pub const fn stars(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(|v| Self::new(v).ok())
            .ok_or(RatingError::OutOfRange { value })
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        Self::from(rating.0)
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/5", self.0)
    }
}
