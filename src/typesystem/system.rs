//! The type system facade.

use std::path::PathBuf;

use crate::{
    metadata::{
        identity::{AssemblyIdentity, AssemblyVersion},
        model::{AssemblyDefRc, Member, ModuleKind, TypeDefRc, TypeReference},
        provider::{AssemblyResolver, MetadataProvider, ReaderOptions},
    },
    typesystem::{
        resolver::TypeResolver, AssemblyRc, ClrTypeRc, CompilerGeneratedMarker, TypeBuilder,
        TypeCache, TypeSystemLoader,
    },
    Error, Result,
};

/// A set of loaded assemblies, queried as abstract types.
///
/// The type system owns the registry of assemblies, the caches every lookup goes through and
/// the compiler-generated marker. All answers for the same reference are the same [`ClrTypeRc`],
/// and references whose definition is missing degrade to placeholders instead of failing.
///
/// The caches use interior mutability without locking, so a `TypeSystem` is confined to the
/// thread that built it.
///
/// # Examples
///
/// ```rust
/// use dotbridge::prelude::*;
///
/// let corlib = AssemblyDef::create(
///     AssemblyIdentity::simple("mscorlib", AssemblyVersion::new(4, 0, 0, 0)),
///     "mscorlib",
///     ModuleKind::Dll,
/// );
/// let attribute = TypeDef::new(
///     "System.Runtime.CompilerServices",
///     "CompilerGeneratedAttribute",
///     TypeAttributes::PUBLIC,
/// );
/// corlib.main_module().unwrap().add_type(&attribute)?;
/// attribute.add_method(&MethodDef::constructor(MethodAttributes::PUBLIC, Vec::new()))?;
///
/// let app = AssemblyDef::create(
///     AssemblyIdentity::simple("App", AssemblyVersion::new(1, 0, 0, 0)),
///     "App",
///     ModuleKind::Dll,
/// );
/// let widget = TypeDef::new("App", "Widget", TypeAttributes::PUBLIC);
/// app.main_module().unwrap().add_type(&widget)?;
/// widget.add_method(&MethodDef::new("Show", MethodAttributes::PUBLIC, None, Vec::new()))?;
///
/// let provider = MemoryProvider::new()
///     .with_assembly("ref/mscorlib.dll", corlib)
///     .with_assembly("bin/App.dll", app);
/// let system = TypeSystem::new(provider, ["ref/mscorlib.dll"], Some("bin/App.dll"))?;
///
/// let widget = system.find_type("App.Widget").expect("defined by the target");
/// for method in widget.methods() {
///     println!("{}", method.full_name());
/// }
/// assert_eq!(widget.methods()[0].full_name(), "System.Void App.Widget::Show()");
/// # Ok::<(), dotbridge::Error>(())
/// ```
pub struct TypeSystem {
    resolver: TypeResolver,
    target: Option<AssemblyRc>,
    marker: CompilerGeneratedMarker,
}

impl TypeSystem {
    /// Load `locations` and the optional `target` through `provider`
    ///
    /// # Errors
    /// Returns an error if a location cannot be read, or if the compiler-generated marker
    /// is not defined by any loaded assembly.
    pub fn new<P, I, L>(provider: P, locations: I, target: Option<L>) -> Result<Self>
    where
        P: MetadataProvider + 'static,
        I: IntoIterator<Item = L>,
        L: Into<PathBuf>,
    {
        let mut loader = TypeSystemLoader::new().with_assemblies(locations);
        if let Some(target) = target {
            loader = loader.target(target);
        }
        loader.build(provider)
    }

    pub(crate) fn load(
        provider: Box<dyn MetadataProvider>,
        locations: &[PathBuf],
        target: Option<&PathBuf>,
        marker_type: &str,
    ) -> Result<Self> {
        let resolver = TypeResolver::new(provider);

        let mut seen = Vec::with_capacity(locations.len() + 1);
        for location in locations.iter().chain(target) {
            if !seen.contains(location) {
                seen.push(location.clone());
            }
        }

        let mut target_assembly = None;
        for location in seen {
            let is_target = target == Some(&location);
            let options = if is_target {
                ReaderOptions::target()
            } else {
                ReaderOptions::dependency()
            };

            let definition = resolver.provider().read_assembly(&location, options)?;
            let assembly = resolver
                .registry()
                .register(definition, Some(location), options);
            if is_target {
                target_assembly = Some(assembly);
            }
        }

        let marker = CompilerGeneratedMarker::locate(&resolver, marker_type)?;

        log::debug!(
            "type system ready with {} assemblies",
            resolver.registry().len()
        );

        Ok(TypeSystem {
            resolver,
            target: target_assembly,
            marker,
        })
    }

    pub(crate) fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    /// The cache of abstract types handed out so far
    #[must_use]
    pub fn cache(&self) -> &TypeCache {
        self.resolver.cache()
    }

    /// All registered assemblies, in registration order
    #[must_use]
    pub fn assemblies(&self) -> Vec<AssemblyRc> {
        self.resolver.registry().assemblies()
    }

    /// The assembly opened for modification
    #[must_use]
    pub fn target_assembly(&self) -> Option<&AssemblyRc> {
        self.target.as_ref()
    }

    /// Raw definition of the target assembly
    #[must_use]
    pub fn target_definition(&self) -> Option<&AssemblyDefRc> {
        self.target.as_ref().map(|assembly| assembly.definition())
    }

    /// The wrapper registered for a raw assembly
    #[must_use]
    pub fn assembly_of(&self, definition: &AssemblyDefRc) -> Option<AssemblyRc> {
        self.resolver.registry().by_handle(definition)
    }

    /// The marker generated members are tagged with
    #[must_use]
    pub fn marker(&self) -> &CompilerGeneratedMarker {
        &self.marker
    }

    /// First registered assembly with simple name `name`
    #[must_use]
    pub fn find_assembly(&self, name: &str) -> Option<AssemblyRc> {
        self.resolver.registry().find(name)
    }

    /// First type called `full_name`, searching assemblies in registration order
    ///
    /// Nested types use `Outer/Inner`.
    #[must_use]
    pub fn find_type(&self, full_name: &str) -> Option<ClrTypeRc> {
        self.resolver.find_type(full_name)
    }

    /// Type called `full_name` in the assembly with simple name `assembly`
    #[must_use]
    pub fn find_type_in(&self, full_name: &str, assembly: &str) -> Option<ClrTypeRc> {
        let assembly = self.find_assembly(assembly)?;
        self.resolver.find_type_in(full_name, &assembly)
    }

    /// Resolve an assembly reference, see [`crate::typesystem::AssemblyRegistry::resolve_reference`]
    ///
    /// # Errors
    /// Returns [`Error::AssemblyNotFound`] on a miss when `required` is set.
    pub fn resolve_assembly_reference(
        &self,
        name: &AssemblyIdentity,
        required: bool,
    ) -> Result<Option<AssemblyRc>> {
        self.resolver.registry().resolve_reference(name, required)
    }

    /// Register an assembly obtained outside the type system
    pub fn register_assembly(&self, definition: AssemblyDefRc) -> AssemblyRc {
        self.resolver
            .registry()
            .register(definition, None, ReaderOptions::empty())
    }

    /// Create an empty assembly and register it
    pub fn create_and_register_assembly(
        &self,
        name: &str,
        version: AssemblyVersion,
        kind: ModuleKind,
    ) -> AssemblyDefRc {
        let definition = self.resolver.provider().create_assembly(
            AssemblyIdentity::simple(name, version),
            name,
            kind,
        );
        self.resolver.registry().register(
            definition.clone(),
            None,
            ReaderOptions::IN_MEMORY | ReaderOptions::READ_WRITE,
        );
        definition
    }

    /// Start building members of `definition`
    ///
    /// With `tag_compiler_generated` set, the type itself is tagged with the marker.
    ///
    /// # Errors
    /// Returns [`Error::DetachedMember`] if `definition` is not in a module.
    pub fn create_type_builder(
        &self,
        definition: &TypeDefRc,
        tag_compiler_generated: bool,
    ) -> Result<TypeBuilder<'_>> {
        let module = definition
            .module()
            .ok_or_else(|| Error::DetachedMember(definition.full_name()))?;
        if tag_compiler_generated {
            self.tag_compiler_generated(&Member::TypeDef(definition.clone()))?;
        }

        let assembly = module
            .assembly()
            .and_then(|assembly| self.assembly_of(&assembly));
        Ok(TypeBuilder::new(self, definition.clone(), module, assembly))
    }

    /// Resolve `reference` to its abstract type
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for generic parameters without a usable owner. Missing
    /// definitions are not errors.
    pub fn resolve_type_reference(&self, reference: &TypeReference) -> Result<ClrTypeRc> {
        self.resolver.resolve(reference)
    }

    /// Abstract type of a definition
    #[must_use]
    pub fn type_of(&self, definition: &TypeDefRc) -> ClrTypeRc {
        self.resolver.resolve_definition(definition)
    }

    /// Tag `member` as compiler-generated, returning `true` if an attribute was added
    ///
    /// Members already tagged, and members of a tagged type, are left unchanged.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedMember`] for references and [`Error::DetachedMember`] for
    /// members not yet added to a module.
    pub fn tag_compiler_generated(&self, member: &Member) -> Result<bool> {
        self.marker.tag(&self.resolver, member)
    }
}

impl AssemblyResolver for TypeSystem {
    fn resolve(&self, name: &AssemblyIdentity) -> Result<AssemblyDefRc> {
        self.resolver.registry().resolve(name)
    }

    fn coerce(&self, name: &AssemblyIdentity) -> AssemblyIdentity {
        self.resolver.registry().coerce(name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        metadata::{
            model::{
                FieldAttributes, MethodAttributes, MethodReference, ParameterDef, TypeAttributes,
                TypeDef,
            },
            provider::MemoryProvider,
        },
        test::{corlib, library, TestSystem},
    };

    #[test]
    fn test_load_order_and_target() {
        let system = TestSystem::new().with_target().build().unwrap();

        let names: Vec<_> = system
            .assemblies()
            .iter()
            .map(|assembly| assembly.name().to_string())
            .collect();
        assert_eq!(names, vec!["mscorlib", "Library", "App"]);

        let target = system.target_assembly().unwrap();
        assert_eq!(target.name(), "App");
        assert!(target.is_writable());
        assert_eq!(target.options(), ReaderOptions::target());
        assert!(!system.find_assembly("Library").unwrap().is_writable());
    }

    #[test]
    fn test_duplicate_locations_load_once() {
        let provider = MemoryProvider::new()
            .with_assembly("mscorlib.dll", corlib())
            .with_assembly("Library.dll", library());

        let system = TypeSystem::new(
            provider,
            ["mscorlib.dll", "Library.dll", "mscorlib.dll"],
            Some("Library.dll"),
        )
        .unwrap();

        assert_eq!(system.assemblies().len(), 2);
        // a target that is also an input keeps its input position but is opened writable
        assert_eq!(system.assemblies()[1].name(), "Library");
        assert!(system.assemblies()[1].is_writable());
    }

    #[test]
    fn test_missing_location_fails() {
        let provider = MemoryProvider::new().with_assembly("mscorlib.dll", corlib());
        let result = TypeSystem::new(provider, ["mscorlib.dll", "Gone.dll"], None::<&str>);
        assert!(matches!(result, Err(Error::LocationNotFound(_))));
    }

    #[test]
    fn test_missing_marker_fails() {
        let provider = MemoryProvider::new().with_assembly("Library.dll", library());
        let result = TypeSystem::new(provider, ["Library.dll"], None::<&str>);
        assert!(matches!(result, Err(Error::MarkerNotFound(_))));
    }

    #[test]
    fn test_find_type_in() {
        let system = TestSystem::new().build().unwrap();
        assert!(system.find_type_in("Library.Shape", "Library").is_some());
        assert!(system.find_type_in("Library.Shape", "mscorlib").is_none());
        assert!(system.find_type_in("Library.Shape", "Nowhere").is_none());
    }

    #[test]
    fn test_create_and_register_assembly() {
        let system = TestSystem::new().build().unwrap();
        let created = system.create_and_register_assembly(
            "Generated",
            AssemblyVersion::new(1, 0, 0, 0),
            ModuleKind::Dll,
        );

        let wrapper = system.find_assembly("Generated").unwrap();
        assert!(Arc::ptr_eq(wrapper.definition(), &created));
        assert!(Arc::ptr_eq(&system.assembly_of(&created).unwrap(), &wrapper));
        assert!(wrapper.is_writable());
        assert!(created.main_module().is_some());
    }

    #[test]
    fn test_type_builder_requires_module() {
        let system = TestSystem::new().build().unwrap();
        let loose = TypeDef::new("Loose", "Type", TypeAttributes::PUBLIC);
        assert!(matches!(
            system.create_type_builder(&loose, false),
            Err(Error::DetachedMember(_))
        ));
    }

    #[test]
    fn test_dropping_system_releases_graph() {
        let system = TestSystem::new().with_target().build().unwrap();
        let definition_of = |full_name: &str| {
            system.find_type(full_name).unwrap().definition().unwrap().clone()
        };

        let corlib = Arc::downgrade(system.find_assembly("mscorlib").unwrap().definition());
        let string = Arc::downgrade(&definition_of("System.String"));
        let object = Arc::downgrade(&definition_of("System.Object"));
        let view = Arc::downgrade(&definition_of("App.MainView"));

        // a generated type pointing at itself and at types of other assemblies
        let node = TypeDef::new("App", "Node", TypeAttributes::PUBLIC);
        system
            .target_definition()
            .unwrap()
            .main_module()
            .unwrap()
            .add_type(&node)
            .unwrap();
        {
            let builder = system.create_type_builder(&node, true).unwrap();
            let this = TypeReference::from(&node);
            builder
                .define_field("next", FieldAttributes::PRIVATE, &this)
                .unwrap();
            builder
                .define_method(
                    "Describe",
                    MethodAttributes::PUBLIC,
                    Some(TypeReference::from(definition_of("System.String"))),
                    vec![ParameterDef::new("other", this)],
                )
                .unwrap();
            builder
                .set_base_type(&TypeReference::from(definition_of("App.MainView")))
                .unwrap();
        }
        let node = Arc::downgrade(&node);

        // the marker constructor lives next to Object, so the attribute keeps a definition
        let object_ctor = definition_of("System.Object")
            .constructors()
            .next()
            .unwrap()
            .clone();
        assert!(system
            .tag_compiler_generated(&Member::MethodDef(object_ctor.clone()))
            .unwrap());
        let attribute = object_ctor.custom_attributes.get(0).unwrap();
        assert!(matches!(attribute.constructor, MethodReference::Definition(_)));
        drop(object_ctor);

        drop(system);
        assert!(corlib.upgrade().is_none());
        assert!(string.upgrade().is_none());
        assert!(object.upgrade().is_none());
        assert!(view.upgrade().is_none());
        assert!(node.upgrade().is_none());
    }

    #[test]
    fn test_resolver_facade() {
        let system = TestSystem::new().build().unwrap();
        let request = AssemblyIdentity::simple("Library", AssemblyVersion::new(3, 0, 0, 0));

        let resolved = AssemblyResolver::resolve(&system, &request).unwrap();
        assert_eq!(resolved.name(), "Library");
        assert_eq!(system.coerce(&request).version, resolved.identity.version);
    }
}
