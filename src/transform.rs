//! # Reversible Transforms
//!
//! Byte-to-byte operations applied before writing to, and removed after
//! reading from, raw storage.
//!
//! ## Overview
//!
//! A [`Transform`] is an ordered sequence of [`Reversible`] steps. Writing
//! applies the steps in ascending order; reading removes them in descending
//! order, so layered encodings unwind with stack discipline:
//!
//! ```text
//! write:  data ──▶ A.apply ──▶ B.apply ──▶ C.apply ──▶ storage
//! read:   data ◀── A.remove ◀── B.remove ◀── C.remove ◀── storage
//! ```
//!
//! Steps are immutable and shared behind `Arc`, so one transform can be
//! reused by any number of files and chains at once.
//!
//! ## Example
//!
//! ```rust
//! use blobfs::Transform;
//!
//! let reverse = Transform::new(
//!     |data| Ok(data.iter().rev().copied().collect()),
//!     |data| Ok(data.iter().rev().copied().collect()),
//! );
//! let bump = Transform::new(
//!     |data| Ok(data.iter().map(|b| b.wrapping_add(1)).collect()),
//!     |data| Ok(data.iter().map(|b| b.wrapping_sub(1)).collect()),
//! );
//!
//! let chained = Transform::chain([&reverse, &bump]);
//! let stored = chained.apply(b"abc").unwrap();
//! assert_eq!(stored, b"dcb");
//! assert_eq!(chained.remove(&stored).unwrap(), b"abc");
//! ```

use std::fmt;
use std::io;
use std::sync::Arc;

/// A single reversible byte operation.
///
/// Implementations must satisfy `remove(apply(x)) == x`; this is not checked.
///
/// # Thread Safety
///
/// Steps are shared across files, so they must be `Send + Sync` and
/// stateless from the caller's point of view.
pub trait Reversible: Send + Sync {
    /// Run the forward operation.
    fn apply(&self, data: &[u8]) -> io::Result<Vec<u8>>;

    /// Undo the forward operation.
    fn remove(&self, data: &[u8]) -> io::Result<Vec<u8>>;

    /// Short name used in debug output.
    fn name(&self) -> &str {
        "transform"
    }
}

type ByteFn = dyn Fn(&[u8]) -> io::Result<Vec<u8>> + Send + Sync;

/// A [`Reversible`] step built from a pair of closures.
struct FnStep {
    apply: Box<ByteFn>,
    remove: Box<ByteFn>,
}

impl Reversible for FnStep {
    fn apply(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        (self.apply)(data)
    }

    fn remove(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        (self.remove)(data)
    }
}

struct Identity;

impl Reversible for Identity {
    fn apply(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn remove(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// An ordered chain of reversible steps.
///
/// Cloning is cheap: the steps are reference-counted and never mutated.
#[derive(Clone)]
pub struct Transform {
    steps: Arc<[Arc<dyn Reversible>]>,
}

impl Transform {
    /// Create a transform from forward and backward functions.
    pub fn new<A, R>(apply: A, remove: R) -> Self
    where
        A: Fn(&[u8]) -> io::Result<Vec<u8>> + Send + Sync + 'static,
        R: Fn(&[u8]) -> io::Result<Vec<u8>> + Send + Sync + 'static,
    {
        Self::from_step(FnStep {
            apply: Box::new(apply),
            remove: Box::new(remove),
        })
    }

    /// Wrap any [`Reversible`] implementation.
    pub fn from_step(step: impl Reversible + 'static) -> Self {
        Self {
            steps: Arc::from(vec![Arc::new(step) as Arc<dyn Reversible>]),
        }
    }

    /// A transform that leaves data untouched.
    pub fn identity() -> Self {
        Self::from_step(Identity)
    }

    /// Combine transforms into one.
    ///
    /// The result applies the inputs in the given order on write and removes
    /// them in reverse on read. Inputs are not modified and stay usable.
    pub fn chain<'a>(transforms: impl IntoIterator<Item = &'a Transform>) -> Self {
        let steps: Vec<Arc<dyn Reversible>> = transforms
            .into_iter()
            .flat_map(|t| t.steps.iter().cloned())
            .collect();
        Self {
            steps: Arc::from(steps),
        }
    }

    /// Run every step forward, first to last.
    ///
    /// # Errors
    ///
    /// Returns the first step failure unchanged.
    pub fn apply(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut data = data.to_vec();
        for step in self.steps.iter() {
            data = step.apply(&data)?;
        }
        Ok(data)
    }

    /// Undo every step, last to first.
    ///
    /// # Errors
    ///
    /// Returns the first step failure unchanged.
    pub fn remove(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut data = data.to_vec();
        for step in self.steps.iter().rev() {
            data = step.remove(&data)?;
        }
        Ok(data)
    }

    /// Number of steps in the chain.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the chain has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|s| s.name()))
            .finish()
    }
}
