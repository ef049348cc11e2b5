//! Lazy, restartable value generators.
//!
//! A [`Generator`] wraps the pure draw logic for one value shape. It holds
//! no mutable state: every [`Generator::draw`] performs an independent
//! computation from the caller-supplied RNG, so identical entropy yields
//! identical values and draws may run interleaved or concurrently without
//! synchronization. Shrinking and repetition belong to the external
//! testing engine; this type only has to compose under it.

use std::fmt;
use std::sync::Arc;

use rand::RngCore;

use crate::error::DrawError;

type DrawFn<T> = dyn Fn(&mut dyn RngCore) -> Result<T, DrawError> + Send + Sync;

/// A lazy generator of values of type `T`.
///
/// Cloning is cheap (shared `Arc`) and clones draw identically.
pub struct Generator<T> {
    draw: Arc<DrawFn<T>>,
}

impl<T> Clone for Generator<T> {
    fn clone(&self) -> Self {
        Self {
            draw: Arc::clone(&self.draw),
        }
    }
}

impl<T> fmt::Debug for Generator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator").finish_non_exhaustive()
    }
}

impl<T: 'static> Generator<T> {
    /// Wrap a draw function.
    pub fn new<F>(draw: F) -> Self
    where
        F: Fn(&mut dyn RngCore) -> Result<T, DrawError> + Send + Sync + 'static,
    {
        Self {
            draw: Arc::new(draw),
        }
    }

    /// A generator that always yields a clone of `value`.
    pub fn constant(value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        Self::new(move |_| Ok(value.clone()))
    }

    /// Perform one draw. Independent of any previous or concurrent draw.
    ///
    /// # Errors
    ///
    /// Returns [`DrawError::Exhausted`] if a bounded internal retry budget
    /// ran out (only possible for constraint combinations documented to
    /// exhaust, e.g. `uniqueItems`).
    pub fn draw(&self, rng: &mut dyn RngCore) -> Result<T, DrawError> {
        (self.draw)(rng)
    }

    /// Derive a generator by transforming every drawn value.
    pub fn map<U, F>(&self, f: F) -> Generator<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let inner = Arc::clone(&self.draw);
        Generator::new(move |rng| inner(rng).map(&f))
    }
}
