//! `PropertySet` for pass communication.
//!
//! Passes share the target architecture, its lane graph and the results of
//! earlier passes through a [`PropertySet`]. Results are stored by type:
//!
//! ```
//! use lanes_compile::PropertySet;
//!
//! #[derive(Debug, PartialEq)]
//! struct MovesDropped(usize);
//!
//! let mut props = PropertySet::new();
//! props.insert(MovesDropped(3));
//! assert_eq!(props.get::<MovesDropped>(), Some(&MovesDropped(3)));
//! ```

use std::any::{Any, TypeId};
use std::sync::Arc;

use lanes_analysis::DEFAULT_MAX_ITERATIONS;
use lanes_arch::{ArchSpec, PathFinder};
use rustc_hash::FxHashMap;

use crate::error::{CompileError, CompileResult};

/// Shared state passed through every compilation pass.
pub struct PropertySet {
    /// The target architecture.
    pub arch: Option<Arc<ArchSpec>>,
    /// Lane graph of `arch`.
    pub path_finder: Option<Arc<PathFinder>>,
    /// Block-visit cap for atom-state interpretation.
    pub max_iterations: usize,
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for PropertySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertySet")
            .field("arch", &self.arch.is_some())
            .field("max_iterations", &self.max_iterations)
            .field("custom", &self.custom.len())
            .finish()
    }
}

impl PropertySet {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self {
            arch: None,
            path_finder: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            custom: FxHashMap::default(),
        }
    }

    /// Set the target, building its lane graph.
    #[must_use]
    pub fn with_arch(mut self, arch: Arc<ArchSpec>) -> Self {
        self.path_finder = Some(Arc::new(PathFinder::new(Arc::clone(&arch))));
        self.arch = Some(arch);
        self
    }

    /// Set the target and an already built lane graph.
    #[must_use]
    pub fn with_path_finder(mut self, path_finder: Arc<PathFinder>) -> Self {
        self.arch = Some(Arc::clone(path_finder.arch()));
        self.path_finder = Some(path_finder);
        self
    }

    /// Set the block-visit cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// The target architecture, or [`CompileError::MissingArch`].
    pub fn require_arch(&self) -> CompileResult<&Arc<ArchSpec>> {
        self.arch.as_ref().ok_or(CompileError::MissingArch)
    }

    /// The lane graph, or [`CompileError::MissingArch`].
    pub fn require_path_finder(&self) -> CompileResult<&Arc<PathFinder>> {
        self.path_finder.as_ref().ok_or(CompileError::MissingArch)
    }

    /// Insert a custom property, replacing any value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|b| b.downcast_ref())
    }

    /// Get a mutable reference to a custom property.
    pub fn get_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|b| b.downcast_mut())
    }

    /// Remove and return a custom property.
    pub fn remove<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|b| b.downcast().ok())
            .map(|b| *b)
    }

    /// Check if a custom property is present.
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.custom.contains_key(&TypeId::of::<T>())
    }
}

impl Default for PropertySet {
    fn default() -> Self {
        Self::new()
    }
}
