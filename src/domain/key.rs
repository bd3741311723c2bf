//! Key extraction for stream elements.
//!
//! Two elements are duplicates when their selected keys compare equal. Key
//! selectors must be deterministic and free of side effects.

use std::error::Error as StdError;
use std::fmt;
use std::marker::PhantomData;

/// Error returned when a key cannot be derived from an element.
#[derive(Debug, thiserror::Error)]
#[error("failed to extract key: {message}")]
pub struct KeyExtractionError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl KeyExtractionError {
    /// Create an error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The error message, without the cause.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Derives a dedupe key from a stream element.
pub trait KeySelector<T, K>: Send + Sync {
    /// Select the key for `element`.
    ///
    /// # Errors
    /// Returns `KeyExtractionError` if the element is malformed.
    fn select_key(&self, element: &T) -> Result<K, KeyExtractionError>;
}

/// Key selector backed by an infallible closure. See [`key_fn`].
pub struct FnKeySelector<F, T, K> {
    f: F,
    _marker: PhantomData<fn(&T) -> K>,
}

/// Key selector backed by a fallible closure. See [`try_key_fn`].
pub struct TryFnKeySelector<F, T, K> {
    f: F,
    _marker: PhantomData<fn(&T) -> K>,
}

/// Wrap an infallible closure as a key selector.
///
/// # Example
/// ```
/// use stream_dedupe::{key_fn, KeySelector};
///
/// let selector = key_fn(|s: &String| s.len());
/// assert_eq!(selector.select_key(&"abc".to_string()).unwrap(), 3);
/// ```
pub fn key_fn<F, T, K>(f: F) -> FnKeySelector<F, T, K>
where
    F: Fn(&T) -> K + Send + Sync,
{
    FnKeySelector {
        f,
        _marker: PhantomData,
    }
}

/// Wrap a fallible closure as a key selector.
///
/// # Example
/// ```
/// use stream_dedupe::{try_key_fn, KeyExtractionError, KeySelector};
///
/// let selector = try_key_fn(|line: &&str| {
///     line.split(',')
///         .next()
///         .filter(|id| !id.is_empty())
///         .map(str::to_owned)
///         .ok_or_else(|| KeyExtractionError::new("missing id column"))
/// });
///
/// assert_eq!(selector.select_key(&"42,hello").unwrap(), "42");
/// assert!(selector.select_key(&",hello").is_err());
/// ```
pub fn try_key_fn<F, T, K>(f: F) -> TryFnKeySelector<F, T, K>
where
    F: Fn(&T) -> Result<K, KeyExtractionError> + Send + Sync,
{
    TryFnKeySelector {
        f,
        _marker: PhantomData,
    }
}

impl<F, T, K> KeySelector<T, K> for FnKeySelector<F, T, K>
where
    F: Fn(&T) -> K + Send + Sync,
{
    fn select_key(&self, element: &T) -> Result<K, KeyExtractionError> {
        Ok((self.f)(element))
    }
}

impl<F, T, K> KeySelector<T, K> for TryFnKeySelector<F, T, K>
where
    F: Fn(&T) -> Result<K, KeyExtractionError> + Send + Sync,
{
    fn select_key(&self, element: &T) -> Result<K, KeyExtractionError> {
        (self.f)(element)
    }
}

impl<T, K, S> KeySelector<T, K> for std::sync::Arc<S>
where
    S: KeySelector<T, K> + ?Sized,
{
    fn select_key(&self, element: &T) -> Result<K, KeyExtractionError> {
        (**self).select_key(element)
    }
}

impl<F, T, K> fmt::Debug for FnKeySelector<F, T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnKeySelector").finish_non_exhaustive()
    }
}

impl<F, T, K> fmt::Debug for TryFnKeySelector<F, T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryFnKeySelector").finish_non_exhaustive()
    }
}
