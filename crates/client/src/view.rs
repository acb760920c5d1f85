//! Presentation-facing loading state.
//!
//! Every remotely sourced value the presentation layer renders passes
//! through [`DataState`], so "still loading", "loaded", and "failed" are
//! always distinguishable and a failure in one region never hides data
//! that did arrive elsewhere on the same screen.

use crate::error::ApiError;

/// A remotely sourced value, in one of three presentation states.
#[derive(Debug, Default)]
pub enum DataState<T> {
    /// The fetch has not settled yet.
    #[default]
    Loading,
    /// The fetch succeeded.
    Ready(T),
    /// The fetch failed; the error is kept for display.
    Failed(ApiError),
}

impl<T> DataState<T> {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Map the ready value, carrying the other states through unchanged.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DataState<U> {
        match self {
            Self::Loading => DataState::Loading,
            Self::Ready(value) => DataState::Ready(f(value)),
            Self::Failed(err) => DataState::Failed(err),
        }
    }
}

impl<T> From<Result<T, ApiError>> for DataState<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => Self::Failed(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_loading() {
        let state: DataState<i32> = DataState::default();
        assert!(state.is_loading());
        assert!(state.ready().is_none());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_from_result() {
        let ok: DataState<i32> = Ok(7).into();
        assert_eq!(ok.ready(), Some(&7));

        let failed: DataState<i32> =
            DataState::from(Err(ApiError::NotFound("book".to_string())));
        assert!(failed.error().is_some());
    }

    #[test]
    fn test_map_transforms_only_ready() {
        let doubled = DataState::Ready(4).map(|n: i32| n * 2);
        assert_eq!(doubled.ready(), Some(&8));

        let still_loading: DataState<i32> = DataState::Loading;
        assert!(still_loading.map(|n| n * 2).is_loading());
    }
}
