//! Integration tests for the type system facade.
//!
//! These tests load small metadata graphs through the `MemoryProvider` and check the
//! guarantees code generators rely on: stable type identities, placeholders for missing
//! assemblies, registration order, assembly binding tiers and idempotent tagging.

mod common;

use std::sync::Arc;

use common::{provider, vendor_gadget};
use dotbridge::prelude::*;

fn load(locations: &[&str], target: Option<&str>) -> Result<TypeSystem> {
    TypeSystem::new(provider()?, locations.iter().copied(), target)
}

#[test]
fn test_same_reference_resolves_to_same_object() -> Result<()> {
    let system = load(&["ref/Core.dll", "ref/Widgets.dll"], None)?;
    let widgets = system.find_assembly("Widgets").unwrap();
    let button = widgets.find_definition("Widgets.Button").unwrap();

    let field = button.fields().next().unwrap();
    let first = system.resolve_type_reference(&field.field_type)?;
    let second = system.resolve_type_reference(&field.field_type)?;
    assert!(Arc::ptr_eq(&first, &second));

    let object = system.find_type("System.Object").unwrap();
    let again = system.resolve_type_reference(object.reference())?;
    assert!(Arc::ptr_eq(&object, &again));
    Ok(())
}

#[test]
fn test_missing_assembly_yields_shared_placeholder() -> Result<()> {
    let system = load(&["ref/Core.dll", "ref/Widgets.dll", "ref/Plugins.dll"], None)?;

    let button = system
        .find_assembly("Widgets")
        .unwrap()
        .find_definition("Widgets.Button")
        .unwrap();
    let from_widgets = button.fields().next().unwrap().field_type.clone();

    let host = system
        .find_assembly("Plugins")
        .unwrap()
        .find_definition("Plugins.Host")
        .unwrap();
    let attach = host.methods().next().unwrap();
    let from_plugins = attach.parameters[0].parameter_type.clone();

    assert_ne!(from_widgets.id(), from_plugins.id());

    let first = system.resolve_type_reference(&from_widgets)?;
    let second = system.resolve_type_reference(&from_plugins)?;
    assert!(!first.is_resolved());
    assert_eq!(first.key(), Some("Vendor.Gadget"));
    assert_eq!(first.full_name(), "Vendor.Gadget");
    assert_eq!(first.assembly_name().as_deref(), Some("Vendor"));
    assert!(first.methods().is_empty());
    assert!(Arc::ptr_eq(&first, &second));

    // a fresh, structurally equal reference shares it as well
    let third = system.resolve_type_reference(&vendor_gadget())?;
    assert!(Arc::ptr_eq(&first, &third));
    assert_eq!(system.cache().unresolved_count(), 1);
    Ok(())
}

#[test]
fn test_lookups_respect_registration_order() -> Result<()> {
    let system = load(&["ref/Widgets.dll", "ref/Core.dll"], None)?;
    let settings = system.find_type("Shared.Settings").unwrap();
    assert_eq!(settings.assembly_name().as_deref(), Some("Widgets"));

    let system = load(&["ref/Core.dll", "ref/Widgets.dll"], None)?;
    let settings = system.find_type("Shared.Settings").unwrap();
    assert_eq!(settings.assembly_name().as_deref(), Some("Core"));

    let in_widgets = system.find_type_in("Shared.Settings", "Widgets").unwrap();
    assert!(!Arc::ptr_eq(&settings, &in_widgets));
    Ok(())
}

#[test]
fn test_find_assembly_first_registered_wins() -> Result<()> {
    let system = load(&["ref/Core.dll"], None)?;
    let newer = common::core(AssemblyVersion::new(5, 0, 0, 0))?;
    system.register_assembly(newer.clone());

    let found = system.find_assembly("Core").unwrap();
    assert_eq!(found.identity().version, AssemblyVersion::new(4, 0, 0, 0));
    assert!(Arc::ptr_eq(&system.assembly_of(&newer).unwrap(), &system.assemblies()[1]));
    Ok(())
}

#[test]
fn test_assembly_reference_precedence() -> Result<()> {
    let system = load(&["ref/Core.dll"], None)?;
    let newer = common::core(AssemblyVersion::new(5, 0, 0, 0))?;
    system.register_assembly(newer.clone());

    // exact identity beats the first name match
    let exact = AssemblyIdentity::simple("Core", AssemblyVersion::new(5, 0, 0, 0));
    let found = system.resolve_assembly_reference(&exact, true)?.unwrap();
    assert!(Arc::ptr_eq(found.definition(), &newer));

    // without an exact match the first assembly with that name is used
    let other = AssemblyIdentity::simple("Core", AssemblyVersion::new(4, 5, 0, 0));
    let found = system.resolve_assembly_reference(&other, true)?.unwrap();
    assert_eq!(found.identity().version, AssemblyVersion::new(4, 0, 0, 0));

    let missing = AssemblyIdentity::simple("Nowhere", AssemblyVersion::new(1, 0, 0, 0));
    assert!(system.resolve_assembly_reference(&missing, false)?.is_none());
    assert!(matches!(
        system.resolve_assembly_reference(&missing, true),
        Err(Error::AssemblyNotFound(_))
    ));
    Ok(())
}

#[test]
fn test_tagging_is_idempotent() -> Result<()> {
    let system = load(&["ref/Core.dll", "ref/Widgets.dll"], None)?;
    let button = system
        .find_assembly("Widgets")
        .unwrap()
        .find_definition("Widgets.Button")
        .unwrap();
    let field = button.fields().next().unwrap().clone();

    assert!(system.tag_compiler_generated(&Member::Field(field.clone()))?);
    assert!(!system.tag_compiler_generated(&Member::Field(field.clone()))?);
    assert_eq!(field.custom_attributes.count(), 1);

    // once the type is tagged its members are left alone
    assert!(system.tag_compiler_generated(&Member::TypeDef(button.clone()))?);
    let method = MethodDef::new("Click", MethodAttributes::PUBLIC, None, Vec::new());
    button.add_method(&method)?;
    assert!(!system.tag_compiler_generated(&Member::MethodDef(method.clone()))?);
    assert_eq!(method.custom_attributes.count(), 0);
    assert_eq!(button.custom_attributes.count(), 1);
    Ok(())
}

#[test]
fn test_tagging_rejects_references() -> Result<()> {
    let system = load(&["ref/Core.dll"], None)?;
    let TypeReference::Reference(gadget) = vendor_gadget() else {
        unreachable!()
    };
    assert!(matches!(
        system.tag_compiler_generated(&Member::TypeRef(gadget)),
        Err(Error::UnsupportedMember(_))
    ));
    Ok(())
}

#[test]
fn test_create_and_register_assembly() -> Result<()> {
    let system = load(&["ref/Core.dll"], Some("bin/App.dll"))?;
    let target = system.target_assembly().unwrap();
    assert_eq!(target.name(), "App");
    assert!(target.is_writable());

    let created =
        system.create_and_register_assembly("Out", AssemblyVersion::new(1, 0, 0, 0), ModuleKind::Dll);
    let found = system.find_assembly("Out").unwrap();
    assert!(Arc::ptr_eq(found.definition(), &created));
    assert_eq!(found.identity().version, AssemblyVersion::new(1, 0, 0, 0));
    assert_eq!(system.assemblies().len(), 3);
    Ok(())
}

#[test]
fn test_generate_into_target() -> Result<()> {
    let system = load(&["ref/Core.dll", "ref/Widgets.dll"], Some("bin/App.dll"))?;
    let module = system.target_definition().unwrap().main_module().unwrap();

    let generated = TypeDef::new("App.Generated", "ButtonFactory", TypeAttributes::PUBLIC);
    module.add_type(&generated)?;
    let builder = system.create_type_builder(&generated, true)?;

    let object = system.find_type("System.Object").unwrap();
    builder.set_base_type(object.reference())?;
    let button = system.find_type("Widgets.Button").unwrap();
    builder.define_method(
        "Create",
        MethodAttributes::PUBLIC | MethodAttributes::STATIC,
        Some(button.reference().clone()),
        Vec::new(),
    )?;

    let factory = builder.create_type();
    assert!(factory.is_resolved());
    assert_eq!(factory.assembly_name().as_deref(), Some("App"));
    assert!(factory.has_custom_attribute(COMPILER_GENERATED_ATTRIBUTE));

    let create = factory.find_method("Create").unwrap();
    let returned = system.resolve_type_reference(create.return_type().unwrap())?;
    assert!(Arc::ptr_eq(
        returned.definition().unwrap(),
        button.definition().unwrap()
    ));

    let base = system.resolve_type_reference(&factory.base_type().unwrap())?;
    assert!(Arc::ptr_eq(
        base.definition().unwrap(),
        object.definition().unwrap()
    ));
    Ok(())
}

#[test]
fn test_generic_parameters_keyed_by_owner() -> Result<()> {
    let system = load(&["ref/Core.dll"], None)?;

    let first_owner = TypeRef::new("Gone", "Box`1", TypeRefScope::Assembly(common::vendor_identity()));
    let first = GenericParam::new("T", 0);
    first_owner.add_generic_param(&first)?;

    let second_owner = TypeRef::new("Gone", "Bag`1", TypeRefScope::Assembly(common::vendor_identity()));
    let second = GenericParam::new("T", 0);
    second_owner.add_generic_param(&second)?;

    let first = system.resolve_type_reference(&TypeReference::GenericParameter(first))?;
    let second = system.resolve_type_reference(&TypeReference::GenericParameter(second))?;
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.key(), Some("Gone.Box`1|GenericParameter|T"));

    let orphan = TypeReference::GenericParameter(GenericParam::new("T", 0));
    assert!(matches!(
        system.resolve_type_reference(&orphan),
        Err(Error::Malformed { .. })
    ));
    Ok(())
}
