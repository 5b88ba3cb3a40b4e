//! Factories for the metadata graphs used throughout the unit tests.
//!
//! Three assemblies reference each other the way a small application does:
//!
//! - `mscorlib` 4.0.0.0 - core types and `CompilerGeneratedAttribute`
//! - `Library` 2.0.0.0 - shapes built on top of mscorlib, plus a second marker attribute
//! - `App` 1.0.0.0 - the target, deriving from `Library` and using a missing `Vendor` assembly

use crate::{
    metadata::{
        identity::{AssemblyIdentity, AssemblyVersion},
        model::{
            AssemblyDef, AssemblyDefRc, FieldAttributes, FieldDef, GenericParam,
            MethodAttributes, MethodDef, ModuleDefRc, ModuleKind, ParameterDef, TypeAttributes,
            TypeDef, TypeDefRc, TypeRef, TypeRefScope, TypeReference,
        },
        provider::MemoryProvider,
    },
    typesystem::{TypeSystem, TypeSystemLoader},
    Result,
};

pub const CORLIB_LOCATION: &str = "ref/mscorlib.dll";
pub const LIBRARY_LOCATION: &str = "ref/Library.dll";
pub const APP_LOCATION: &str = "bin/App.dll";

fn define(module: &ModuleDefRc, namespace: &str, name: &str, flags: TypeAttributes) -> TypeDefRc {
    let type_def = TypeDef::new(namespace, name, flags);
    module.add_type(&type_def).unwrap();
    type_def
}

fn add_default_constructor(type_def: &TypeDefRc) {
    type_def
        .add_method(&MethodDef::constructor(MethodAttributes::PUBLIC, Vec::new()))
        .unwrap();
}

/// A reference into `assembly`, created the way a reader would produce it
pub fn type_ref(assembly: AssemblyIdentity, namespace: &str, name: &str) -> TypeReference {
    TypeReference::Reference(TypeRef::new(
        namespace,
        name,
        TypeRefScope::Assembly(assembly),
    ))
}

pub fn corlib_identity() -> AssemblyIdentity {
    AssemblyIdentity::simple("mscorlib", AssemblyVersion::new(4, 0, 0, 0))
}

pub fn library_identity() -> AssemblyIdentity {
    AssemblyIdentity::simple("Library", AssemblyVersion::new(2, 0, 0, 0))
}

pub fn corlib() -> AssemblyDefRc {
    let assembly = AssemblyDef::create(corlib_identity(), "mscorlib.dll", ModuleKind::Dll);
    let module = assembly.main_module().unwrap();

    let object = define(&module, "System", "Object", TypeAttributes::PUBLIC);
    add_default_constructor(&object);
    let object_ref = TypeReference::from(&object);

    let string = define(&module, "System", "String", TypeAttributes::PUBLIC | TypeAttributes::SEALED);
    string.set_base_type(object_ref.clone()).unwrap();
    string
        .add_method(&MethodDef::new(
            "Concat",
            MethodAttributes::PUBLIC | MethodAttributes::STATIC,
            Some(TypeReference::from(&string)),
            vec![
                ParameterDef::new("str0", TypeReference::from(&string)),
                ParameterDef::new("str1", TypeReference::from(&string)),
            ],
        ))
        .unwrap();

    define(&module, "System", "Int32", TypeAttributes::PUBLIC | TypeAttributes::SEALED);
    define(
        &module,
        "System",
        "IDisposable",
        TypeAttributes::PUBLIC | TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT,
    );

    let nullable = define(&module, "System", "Nullable`1", TypeAttributes::PUBLIC | TypeAttributes::SEALED);
    nullable.add_generic_param(&GenericParam::new("T", 0)).unwrap();

    let attribute = define(
        &module,
        "System.Runtime.CompilerServices",
        "CompilerGeneratedAttribute",
        TypeAttributes::PUBLIC | TypeAttributes::SEALED,
    );
    attribute.set_base_type(object_ref).unwrap();
    add_default_constructor(&attribute);

    assembly
}

pub fn library() -> AssemblyDefRc {
    let assembly = AssemblyDef::create(library_identity(), "Library.dll", ModuleKind::Dll);
    let module = assembly.main_module().unwrap();
    // references are written against an older corlib than the one loaded
    let corlib = AssemblyIdentity::simple("mscorlib", AssemblyVersion::new(2, 0, 0, 0));
    module.add_assembly_reference(&corlib);

    let shape = define(&module, "Library", "Shape", TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT);
    shape
        .set_base_type(type_ref(corlib.clone(), "System", "Object"))
        .unwrap();
    add_default_constructor(&shape);
    shape
        .add_method(&MethodDef::new(
            "Area",
            MethodAttributes::PUBLIC | MethodAttributes::VIRTUAL | MethodAttributes::ABSTRACT,
            Some(type_ref(corlib.clone(), "System", "Int32")),
            Vec::new(),
        ))
        .unwrap();

    let corner = TypeDef::new("", "Corner", TypeAttributes::NESTED_PUBLIC);
    shape.add_nested_type(&corner).unwrap();

    let container = define(&module, "Library", "Container`1", TypeAttributes::PUBLIC);
    container.add_generic_param(&GenericParam::new("TItem", 0)).unwrap();

    let attribute = define(&module, "Library", "GeneratedAttribute", TypeAttributes::PUBLIC);
    attribute
        .set_base_type(type_ref(corlib, "System", "Object"))
        .unwrap();
    add_default_constructor(&attribute);

    assembly
}

pub fn app() -> AssemblyDefRc {
    let assembly = AssemblyDef::create(
        AssemblyIdentity::simple("App", AssemblyVersion::new(1, 0, 0, 0)),
        "App.dll",
        ModuleKind::Windows,
    );
    let module = assembly.main_module().unwrap();
    let library = AssemblyIdentity::simple("Library", AssemblyVersion::new(1, 0, 0, 0));
    let vendor = AssemblyIdentity::simple("Vendor", AssemblyVersion::new(3, 1, 0, 0));

    let view = define(&module, "App", "MainView", TypeAttributes::PUBLIC);
    view.set_base_type(type_ref(library, "Library", "Shape"))
        .unwrap();
    view.add_field(&FieldDef::new(
        "_gadget",
        FieldAttributes::PRIVATE,
        type_ref(vendor, "Vendor", "Gadget"),
    ))
    .unwrap();

    assembly
}

/// Provider serving all three assemblies at their usual locations
pub fn provider() -> MemoryProvider {
    MemoryProvider::new()
        .with_assembly(CORLIB_LOCATION, corlib())
        .with_assembly(LIBRARY_LOCATION, library())
        .with_assembly(APP_LOCATION, app())
}

/// Builder for a type system over the test assemblies.
pub struct TestSystem {
    loader: TypeSystemLoader,
}

impl TestSystem {
    pub fn new() -> Self {
        TestSystem {
            loader: TypeSystemLoader::new()
                .with_assembly(CORLIB_LOCATION)
                .with_assembly(LIBRARY_LOCATION),
        }
    }

    pub fn with_target(mut self) -> Self {
        self.loader = self.loader.target(APP_LOCATION);
        self
    }

    pub fn build(self) -> Result<TypeSystem> {
        self.loader.build(provider())
    }
}
