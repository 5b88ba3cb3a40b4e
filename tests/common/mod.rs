//! Metadata graphs shared by the integration tests.
//!
//! `Core` defines `CompilerGeneratedAttribute`, `Widgets` references a `Vendor` assembly that
//! is never loaded, and `Plugins` references the same missing type independently.

#![allow(dead_code)]

use dotbridge::prelude::*;

pub const MARKER_NAMESPACE: &str = "System.Runtime.CompilerServices";

pub fn vendor_identity() -> AssemblyIdentity {
    AssemblyIdentity::simple("Vendor", AssemblyVersion::new(3, 0, 0, 0))
}

pub fn vendor_gadget() -> TypeReference {
    TypeReference::Reference(TypeRef::new(
        "Vendor",
        "Gadget",
        TypeRefScope::Assembly(vendor_identity()),
    ))
}

pub fn add_type(assembly: &AssemblyDefRc, namespace: &str, name: &str) -> Result<TypeDefRc> {
    let type_def = TypeDef::new(namespace, name, TypeAttributes::PUBLIC);
    assembly
        .main_module()
        .expect("created assemblies have a main module")
        .add_type(&type_def)?;
    Ok(type_def)
}

pub fn core(version: AssemblyVersion) -> Result<AssemblyDefRc> {
    let assembly = AssemblyDef::create(
        AssemblyIdentity::simple("Core", version),
        "Core.dll",
        ModuleKind::Dll,
    );
    add_type(&assembly, "System", "Object")?;
    add_type(&assembly, "Shared", "Settings")?;
    let marker = add_type(&assembly, MARKER_NAMESPACE, "CompilerGeneratedAttribute")?;
    marker.add_method(&MethodDef::constructor(MethodAttributes::PUBLIC, Vec::new()))?;
    Ok(assembly)
}

pub fn widgets() -> Result<AssemblyDefRc> {
    let assembly = AssemblyDef::create(
        AssemblyIdentity::simple("Widgets", AssemblyVersion::new(1, 0, 0, 0)),
        "Widgets.dll",
        ModuleKind::Dll,
    );
    let button = add_type(&assembly, "Widgets", "Button")?;
    add_type(&assembly, "Shared", "Settings")?;
    button.add_field(&FieldDef::new(
        "gadget",
        FieldAttributes::PRIVATE,
        vendor_gadget(),
    ))?;
    Ok(assembly)
}

pub fn plugins() -> Result<AssemblyDefRc> {
    let assembly = AssemblyDef::create(
        AssemblyIdentity::simple("Plugins", AssemblyVersion::new(1, 0, 0, 0)),
        "Plugins.dll",
        ModuleKind::Dll,
    );
    let host = add_type(&assembly, "Plugins", "Host")?;
    host.add_method(&MethodDef::new(
        "Attach",
        MethodAttributes::PUBLIC,
        None,
        vec![ParameterDef::new("gadget", vendor_gadget())],
    ))?;
    Ok(assembly)
}

pub fn provider() -> Result<MemoryProvider> {
    Ok(MemoryProvider::new()
        .with_assembly("ref/Core.dll", core(AssemblyVersion::new(4, 0, 0, 0))?)
        .with_assembly("ref/Widgets.dll", widgets()?)
        .with_assembly("ref/Plugins.dll", plugins()?)
        .with_assembly(
            "bin/App.dll",
            AssemblyDef::create(
                AssemblyIdentity::simple("App", AssemblyVersion::new(1, 0, 0, 0)),
                "App.dll",
                ModuleKind::Console,
            ),
        ))
}
