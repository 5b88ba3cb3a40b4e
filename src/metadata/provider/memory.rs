use std::{
    cell::RefCell,
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    metadata::{
        model::AssemblyDefRc,
        provider::{MetadataProvider, ReaderOptions},
    },
    Error, Result,
};

/// A provider serving pre-built assemblies from a location map.
///
/// Used by embedders that construct their metadata graphs directly, and throughout the test
/// suite. Reading the same location twice hands out the same assembly node, and the options
/// of the last successful read of each location are remembered.
#[derive(Default)]
pub struct MemoryProvider {
    assemblies: HashMap<PathBuf, AssemblyDefRc>,
    reads: RefCell<HashMap<PathBuf, ReaderOptions>>,
}

impl MemoryProvider {
    /// Create an empty provider
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `assembly` at `location`
    #[must_use]
    pub fn with_assembly(mut self, location: impl Into<PathBuf>, assembly: AssemblyDefRc) -> Self {
        self.insert(location, assembly);
        self
    }

    /// Serve `assembly` at `location`, replacing whatever was there
    pub fn insert(&mut self, location: impl Into<PathBuf>, assembly: AssemblyDefRc) {
        self.assemblies.insert(location.into(), assembly);
    }

    /// Number of locations served
    #[must_use]
    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    /// Returns `true` if nothing is served
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }

    /// Options `location` was last read with, `None` if it was never read
    #[must_use]
    pub fn opened_with(&self, location: &Path) -> Option<ReaderOptions> {
        self.reads.borrow().get(location).copied()
    }
}

impl MetadataProvider for MemoryProvider {
    fn read_assembly(&self, location: &Path, options: ReaderOptions) -> Result<AssemblyDefRc> {
        log::trace!("reading {} with {:?}", location.display(), options);
        let assembly = self
            .assemblies
            .get(location)
            .cloned()
            .ok_or_else(|| Error::LocationNotFound(location.to_path_buf()))?;

        self.reads
            .borrow_mut()
            .insert(location.to_path_buf(), options);
        Ok(assembly)
    }
}
