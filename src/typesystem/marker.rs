//! Tagging generated members with `CompilerGeneratedAttribute`.

use std::sync::Arc;

use crate::{
    metadata::model::{
        CustomAttribute, CustomAttributeList, Member, MethodDefRc, MethodReference, TypeDefRc,
    },
    typesystem::resolver::TypeResolver,
    Error, Result,
};

/// Full name of the attribute generated members are tagged with by default
pub const COMPILER_GENERATED_ATTRIBUTE: &str =
    "System.Runtime.CompilerServices.CompilerGeneratedAttribute";

/// The marker attribute type and its constructor, located once when the type system is built.
#[derive(Debug, Clone)]
pub struct CompilerGeneratedMarker {
    attribute_type: TypeDefRc,
    constructor: MethodDefRc,
}

impl CompilerGeneratedMarker {
    /// Locate the attribute `full_name` among the registered assemblies
    ///
    /// The attribute must declare exactly one constructor.
    pub(crate) fn locate(resolver: &TypeResolver, full_name: &str) -> Result<Self> {
        let attribute_type = resolver
            .find_type(full_name)
            .and_then(|found| found.definition().cloned())
            .ok_or_else(|| {
                Error::MarkerNotFound(format!("type '{}' is not in any assembly", full_name))
            })?;

        let constructor = {
            let mut constructors = attribute_type.constructors();
            match (constructors.next(), constructors.next()) {
                (Some(constructor), None) => constructor.clone(),
                (None, _) => {
                    return Err(Error::MarkerNotFound(format!(
                        "type '{}' has no constructor",
                        full_name
                    )))
                }
                (Some(_), Some(_)) => {
                    return Err(Error::MarkerNotFound(format!(
                        "type '{}' has more than one constructor",
                        full_name
                    )))
                }
            }
        };

        log::debug!(
            "using {} as the compiler-generated marker",
            constructor.full_name()
        );

        Ok(CompilerGeneratedMarker {
            attribute_type,
            constructor,
        })
    }

    /// The attribute type
    #[must_use]
    pub fn attribute_type(&self) -> &TypeDefRc {
        &self.attribute_type
    }

    /// The attribute constructor every tag is created with
    #[must_use]
    pub fn constructor(&self) -> &MethodDefRc {
        &self.constructor
    }

    /// Returns `true` if `attribute` is an instance of the marker
    pub(crate) fn is_marker(
        &self,
        resolver: &TypeResolver,
        attribute: &CustomAttribute,
    ) -> Result<bool> {
        let Some(attribute_type) = attribute.attribute_type() else {
            return Ok(false);
        };

        Ok(resolver
            .definition_of(&attribute_type)?
            .is_some_and(|definition| Arc::ptr_eq(&definition, &self.attribute_type)))
    }

    /// Returns `true` if any attribute in `attributes` is the marker
    pub(crate) fn is_tagged(
        &self,
        resolver: &TypeResolver,
        attributes: &CustomAttributeList,
    ) -> Result<bool> {
        for (_, attribute) in attributes.iter() {
            if self.is_marker(resolver, attribute)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Tag `member` with the marker
    ///
    /// Members of a tagged type and members already tagged are left alone. Returns `true` if
    /// an attribute was added.
    pub(crate) fn tag(&self, resolver: &TypeResolver, member: &Member) -> Result<bool> {
        let attributes = member
            .custom_attributes()
            .ok_or_else(|| Error::UnsupportedMember(member.full_name()))?;

        if !member.is_type() {
            if let Some(declaring_type) = member.declaring_type() {
                if let Some(declaring_type) = resolver.definition_of(&declaring_type)? {
                    if self.is_tagged(resolver, &declaring_type.custom_attributes)? {
                        return Ok(false);
                    }
                }
            }
        }

        if self.is_tagged(resolver, attributes)? {
            return Ok(false);
        }

        let module = member
            .module()
            .ok_or_else(|| Error::DetachedMember(member.full_name()))?;
        let main_module = module
            .assembly()
            .and_then(|assembly| assembly.main_module())
            .unwrap_or(module);

        let constructor =
            main_module.import_method(&MethodReference::from(&self.constructor));
        attributes.push(CustomAttribute::new(constructor));

        log::trace!("tagged {} as compiler-generated", member.full_name());
        Ok(true)
    }
}
