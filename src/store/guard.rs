use std::ops::{Deref, DerefMut};

use super::{QuerySource, StoreError};

/// Scoped ownership of a [`QuerySource`]
///
/// `close()` runs exactly once: explicitly through [`SourceGuard::close`], or
/// from `Drop` when the guard goes out of scope on an error or panic path.
pub struct SourceGuard<S: QuerySource> {
    source: S,
    closed: bool,
}

impl<S: QuerySource> SourceGuard<S> {
    /// Take ownership of an open source
    pub fn new(source: S) -> Self {
        Self {
            source,
            closed: false,
        }
    }

    /// Run `f` against the source, then close it regardless of the outcome.
    ///
    /// An error from `f` takes precedence over a close failure.
    pub fn run<T, E, F>(source: S, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut S) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut guard = Self::new(source);
        let result = f(&mut guard.source);
        let closed = guard.close();
        match result {
            Ok(value) => {
                closed?;
                Ok(value)
            }
            Err(e) => {
                if let Err(close_err) = closed {
                    log::warn!("Failed to close store after error: {}", close_err);
                }
                Err(e)
            }
        }
    }

    /// Close the source now, surfacing any error
    pub fn close(mut self) -> Result<(), StoreError> {
        self.closed = true;
        self.source.close()
    }
}

impl<S: QuerySource> Deref for SourceGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.source
    }
}

impl<S: QuerySource> DerefMut for SourceGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: QuerySource> Drop for SourceGuard<S> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.source.close() {
                log::warn!("Failed to close store: {}", e);
            }
        }
    }
}
