//! The seam between the type system and a concrete metadata backend.
//!
//! The type system never reads assemblies itself. Everything it needs from a backend is
//! captured by two narrow traits:
//!
//! - [`MetadataProvider`] - reads assemblies, resolves type references to definitions and
//!   creates empty assemblies. Implemented by backends; [`MemoryProvider`] ships with the crate.
//! - [`AssemblyResolver`] - resolves assembly names to loaded assemblies. Implemented by the
//!   type system and handed to the provider whenever a type reference crosses an assembly
//!   boundary, so the provider never owns a resolution policy of its own.
//!
//! # Examples
//!
//! ```rust
//! use dotbridge::metadata::{
//!     identity::{AssemblyIdentity, AssemblyVersion},
//!     model::{AssemblyDef, ModuleKind},
//!     provider::{MemoryProvider, MetadataProvider, ReaderOptions},
//! };
//!
//! let assembly = AssemblyDef::create(
//!     AssemblyIdentity::simple("MyLib", AssemblyVersion::new(1, 0, 0, 0)),
//!     "MyLib.dll",
//!     ModuleKind::Dll,
//! );
//! let provider = MemoryProvider::new().with_assembly("lib/MyLib.dll", assembly);
//!
//! let loaded = provider.read_assembly("lib/MyLib.dll".as_ref(), ReaderOptions::dependency())?;
//! assert_eq!(loaded.name(), "MyLib");
//! # Ok::<(), dotbridge::Error>(())
//! ```

mod memory;

use std::path::Path;

use bitflags::bitflags;

use crate::{
    metadata::{
        identity::AssemblyIdentity,
        model::{AssemblyDef, AssemblyDefRc, ModuleKind, TypeDefRc, TypeRef, TypeRefScope, TypeReference},
    },
    Result,
};

pub use memory::MemoryProvider;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// How an assembly is opened by the provider
    pub struct ReaderOptions: u32 {
        /// Read metadata on first access rather than up front
        const DEFERRED = 0x0001;
        /// Copy the image into memory, releasing the file immediately
        const IN_MEMORY = 0x0002;
        /// Open for modification and later writing
        const READ_WRITE = 0x0004;
        /// Read debug symbols alongside the image
        const READ_SYMBOLS = 0x0008;
    }
}

impl ReaderOptions {
    /// Options for read-only input assemblies
    #[must_use]
    pub const fn dependency() -> Self {
        Self::DEFERRED.union(Self::IN_MEMORY)
    }

    /// Options for the assembly being produced: writable and symbol enabled
    #[must_use]
    pub const fn target() -> Self {
        Self::dependency()
            .union(Self::READ_WRITE)
            .union(Self::READ_SYMBOLS)
    }
}

/// Resolves assembly names against the set of loaded assemblies.
pub trait AssemblyResolver {
    /// Resolve `name` to a loaded assembly
    ///
    /// # Errors
    /// Returns [`crate::Error::AssemblyNotFound`] if no loaded assembly matches.
    fn resolve(&self, name: &AssemblyIdentity) -> Result<AssemblyDefRc>;

    /// Map `name` to the name of the loaded assembly it resolves to, or return it unchanged
    fn coerce(&self, name: &AssemblyIdentity) -> AssemblyIdentity;
}

/// A backend producing metadata graphs.
pub trait MetadataProvider {
    /// Open the assembly at `location`
    ///
    /// # Errors
    /// Returns an error if nothing can be read from `location`.
    fn read_assembly(&self, location: &Path, options: ReaderOptions) -> Result<AssemblyDefRc>;

    /// Resolve `reference` to the definition it denotes
    ///
    /// Returns `Ok(None)` when the reference has no definition, e.g. generic parameters or
    /// references into modules that are gone. Assembly-scoped references go through
    /// `resolver`, whose errors are passed on.
    ///
    /// # Errors
    /// Returns [`crate::Error::AssemblyNotFound`] if the defining assembly is not loaded.
    fn resolve_type(
        &self,
        reference: &TypeReference,
        resolver: &dyn AssemblyResolver,
    ) -> Result<Option<TypeDefRc>> {
        match reference {
            TypeReference::Definition(type_def) => Ok(type_def.upgrade()),
            TypeReference::Reference(type_ref) => resolve_type_ref(type_ref, resolver),
            TypeReference::GenericInstance(_) | TypeReference::Array(_) => {
                self.resolve_type(&reference.element_type(), resolver)
            }
            TypeReference::GenericParameter(_) => Ok(None),
        }
    }

    /// Create a new, empty assembly with a single main module
    fn create_assembly(
        &self,
        identity: AssemblyIdentity,
        module_name: &str,
        kind: ModuleKind,
    ) -> AssemblyDefRc {
        AssemblyDef::create(identity, module_name, kind)
    }
}

fn resolve_type_ref(type_ref: &TypeRef, resolver: &dyn AssemblyResolver) -> Result<Option<TypeDefRc>> {
    match &type_ref.scope {
        TypeRefScope::Assembly(name) => {
            let assembly = resolver.resolve(name)?;
            Ok(assembly.find_type(&type_ref.full_name()))
        }
        TypeRefScope::Module(module) => Ok(module
            .upgrade()
            .and_then(|module| module.find_type(&type_ref.full_name()))),
        TypeRefScope::Nested(outer) => Ok(resolve_type_ref(outer, resolver)?
            .and_then(|outer| outer.find_nested(&type_ref.name))),
    }
}
