use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    metadata::{
        identity::AssemblyIdentity,
        model::{AssemblyDefRc, TypeDefRc},
        provider::ReaderOptions,
    },
    typesystem::{ClrTypeRc, TypeSystem},
};

/// Reference to an `Assembly`
pub type AssemblyRc = Arc<Assembly>;

/// A registered assembly: the raw definition plus how it was obtained.
pub struct Assembly {
    definition: AssemblyDefRc,
    location: Option<PathBuf>,
    options: ReaderOptions,
}

impl Assembly {
    pub(crate) fn new(
        definition: AssemblyDefRc,
        location: Option<PathBuf>,
        options: ReaderOptions,
    ) -> AssemblyRc {
        Arc::new(Assembly {
            definition,
            location,
            options,
        })
    }

    /// Simple name
    #[must_use]
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// Full identity
    #[must_use]
    pub fn identity(&self) -> &AssemblyIdentity {
        &self.definition.identity
    }

    /// The raw assembly
    #[must_use]
    pub fn definition(&self) -> &AssemblyDefRc {
        &self.definition
    }

    /// Where the assembly was read from, `None` for created or externally registered ones
    #[must_use]
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Options the assembly was opened with
    #[must_use]
    pub fn options(&self) -> ReaderOptions {
        self.options
    }

    /// Returns `true` if the assembly was opened for modification
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.options.contains(ReaderOptions::READ_WRITE)
    }

    /// Top-level type definitions of every module
    #[must_use]
    pub fn types(&self) -> Vec<TypeDefRc> {
        self.definition
            .modules()
            .flat_map(|module| module.types().cloned().collect::<Vec<_>>())
            .collect()
    }

    /// Raw definition of the type called `full_name`, without going through the type cache
    #[must_use]
    pub fn find_definition(&self, full_name: &str) -> Option<TypeDefRc> {
        self.definition.find_type(full_name)
    }

    /// Abstract type called `full_name` in this assembly
    ///
    /// Goes through `system`'s cache, so repeated lookups yield the same [`ClrTypeRc`].
    #[must_use]
    pub fn find_type(&self, system: &TypeSystem, full_name: &str) -> Option<ClrTypeRc> {
        self.find_definition(full_name)
            .map(|definition| system.resolver().resolve_definition(&definition))
    }
}

impl std::fmt::Debug for Assembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assembly")
            .field("identity", &self.definition.identity.display_name())
            .field("location", &self.location)
            .field("options", &self.options)
            .finish()
    }
}
