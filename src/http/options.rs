//! Per-call option overrides.
//!
//! Each handler declares the option type it reads. A caller that wants a
//! different policy for one call inserts a value of that type; the handler
//! then uses it instead of its constructor-time default. Overrides replace
//! the default wholesale, they are never merged field by field.

use std::fmt;

use http::Extensions;

/// Options type read by one handler.
pub trait HandlerOption: Clone + Send + Sync + 'static {
    /// Stable name used in logs.
    const KEY: &'static str;
}

/// Typed map of per-call handler options.
#[derive(Clone, Default)]
pub struct RequestOptions {
    inner: Extensions,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an override, returning the previous one of the same type.
    pub fn insert<T: HandlerOption>(&mut self, option: T) -> Option<T> {
        self.inner.insert(option)
    }

    pub fn with<T: HandlerOption>(mut self, option: T) -> Self {
        self.insert(option);
        self
    }

    pub fn get<T: HandlerOption>(&self) -> Option<&T> {
        self.inner.get::<T>()
    }

    pub fn remove<T: HandlerOption>(&mut self) -> Option<T> {
        self.inner.remove::<T>()
    }

    /// The override for `T` if one was supplied, otherwise `default`.
    pub fn resolve<T: HandlerOption>(&self, default: &T) -> T {
        match self.get::<T>() {
            Some(option) => {
                tracing::trace!(option = T::KEY, "Using per-request override");
                option.clone()
            }
            None => default.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Drop every override.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("len", &self.inner.len())
            .finish()
    }
}
