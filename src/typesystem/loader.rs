//! `TypeSystemLoader` builder API.

use std::path::PathBuf;

use crate::{
    metadata::provider::MetadataProvider,
    typesystem::{marker::COMPILER_GENERATED_ATTRIBUTE, TypeSystem},
    Result,
};

/// Builder for [`TypeSystem`] instances.
///
/// Input assemblies are loaded in the order they were added, the target last. A location
/// given more than once is loaded once, at its first position. The target is opened for
/// modification with symbols, all others read-only.
///
/// # Usage Examples
///
/// ```rust
/// use dotbridge::prelude::*;
///
/// let corlib = AssemblyDef::create(
///     AssemblyIdentity::simple("mscorlib", AssemblyVersion::new(4, 0, 0, 0)),
///     "mscorlib",
///     ModuleKind::Dll,
/// );
/// let module = corlib.main_module().unwrap();
/// let attribute = TypeDef::new("System.Runtime.CompilerServices", "CompilerGeneratedAttribute", TypeAttributes::PUBLIC);
/// module.add_type(&attribute)?;
/// attribute.add_method(&MethodDef::constructor(MethodAttributes::PUBLIC, Vec::new()))?;
///
/// let provider = MemoryProvider::new().with_assembly("ref/mscorlib.dll", corlib);
/// let system = TypeSystemLoader::new()
///     .with_assembly("ref/mscorlib.dll")
///     .build(provider)?;
///
/// assert_eq!(system.assemblies().len(), 1);
/// # Ok::<(), dotbridge::Error>(())
/// ```
pub struct TypeSystemLoader {
    /// Input assembly locations, in load order
    locations: Vec<PathBuf>,
    /// The assembly being produced
    target: Option<PathBuf>,
    /// Full name of the compiler-generated marker attribute
    marker_type: String,
}

impl TypeSystemLoader {
    /// Create a loader with no assemblies and the default marker
    #[must_use]
    pub fn new() -> Self {
        TypeSystemLoader {
            locations: Vec::new(),
            target: None,
            marker_type: COMPILER_GENERATED_ATTRIBUTE.to_string(),
        }
    }

    /// Add an input assembly
    #[must_use]
    pub fn with_assembly(mut self, location: impl Into<PathBuf>) -> Self {
        self.locations.push(location.into());
        self
    }

    /// Add several input assemblies
    #[must_use]
    pub fn with_assemblies<I, L>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<PathBuf>,
    {
        self.locations
            .extend(locations.into_iter().map(Into::into));
        self
    }

    /// Set the target assembly
    #[must_use]
    pub fn target(mut self, location: impl Into<PathBuf>) -> Self {
        self.target = Some(location.into());
        self
    }

    /// Use another attribute than `CompilerGeneratedAttribute` as the marker
    ///
    /// The attribute must declare exactly one constructor.
    #[must_use]
    pub fn marker_type(mut self, full_name: impl Into<String>) -> Self {
        self.marker_type = full_name.into();
        self
    }

    /// Load all assemblies through `provider`
    ///
    /// # Errors
    /// Returns an error if a location cannot be read or the marker is not found. Nothing is
    /// returned on failure.
    pub fn build<P: MetadataProvider + 'static>(self, provider: P) -> Result<TypeSystem> {
        TypeSystem::load(
            Box::new(provider),
            &self.locations,
            self.target.as_ref(),
            &self.marker_type,
        )
    }
}

impl Default for TypeSystemLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::provider::{MemoryProvider, ReaderOptions},
        test::{app, corlib, library},
        Error,
    };

    #[test]
    fn test_defaults() {
        let loader = TypeSystemLoader::default();
        assert!(loader.locations.is_empty());
        assert!(loader.target.is_none());
        assert_eq!(loader.marker_type, COMPILER_GENERATED_ATTRIBUTE);
    }

    #[test]
    fn test_target_loaded_last() {
        let provider = MemoryProvider::new()
            .with_assembly("App.dll", app())
            .with_assembly("mscorlib.dll", corlib())
            .with_assembly("Library.dll", library());

        let system = TypeSystemLoader::new()
            .target("App.dll")
            .with_assembly("mscorlib.dll")
            .with_assembly("Library.dll")
            .build(provider)
            .unwrap();

        let assemblies = system.assemblies();
        assert_eq!(assemblies.last().unwrap().name(), "App");
        assert_eq!(
            assemblies[0].options(),
            ReaderOptions::dependency()
        );
        assert_eq!(
            assemblies[0].location().unwrap().to_str(),
            Some("mscorlib.dll")
        );
    }

    #[test]
    fn test_custom_marker() {
        let provider = MemoryProvider::new()
            .with_assembly("mscorlib.dll", corlib())
            .with_assembly("Library.dll", library());

        let system = TypeSystemLoader::new()
            .with_assemblies(["mscorlib.dll", "Library.dll"])
            .marker_type("Library.GeneratedAttribute")
            .build(provider)
            .unwrap();
        assert_eq!(
            system.marker().attribute_type().full_name(),
            "Library.GeneratedAttribute"
        );

        let provider = MemoryProvider::new().with_assembly("mscorlib.dll", corlib());
        let result = TypeSystemLoader::new()
            .with_assembly("mscorlib.dll")
            .marker_type("Library.GeneratedAttribute")
            .build(provider);
        assert!(matches!(result, Err(Error::MarkerNotFound(_))));
    }
}
