//! Abstract types and methods handed to the code generator.

use std::sync::Arc;

use crate::metadata::model::{
    MethodDefRc, ParameterDef, TypeDefRc, TypeRef, TypeRefScope, TypeReference,
};

/// Reference to a `ClrType`
pub type ClrTypeRc = Arc<ClrType>;

/// A type as seen by the code generator.
///
/// Every `ClrType` is handed out by the type system's caches, so two lookups that denote the
/// same cached entry return the same allocation and can be compared with [`Arc::ptr_eq`].
pub enum ClrType {
    /// A reference whose definition was located
    Resolved {
        /// The reference this type was requested through
        reference: TypeReference,
        /// The definition it resolved to
        definition: TypeDefRc,
    },
    /// A reference whose definition could not be located
    ///
    /// The generator can still name such a type and reference it from emitted code; it just
    /// cannot inspect its members.
    Unresolved {
        /// The first reference this placeholder was created for
        reference: TypeReference,
        /// The structural key all equivalent references share
        key: String,
    },
}

impl ClrType {
    /// The reference this type was created for
    #[must_use]
    pub fn reference(&self) -> &TypeReference {
        match self {
            ClrType::Resolved { reference, .. } | ClrType::Unresolved { reference, .. } => {
                reference
            }
        }
    }

    /// The resolved definition, `None` for placeholders
    #[must_use]
    pub fn definition(&self) -> Option<&TypeDefRc> {
        match self {
            ClrType::Resolved { definition, .. } => Some(definition),
            ClrType::Unresolved { .. } => None,
        }
    }

    /// The placeholder key, `None` for resolved types
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            ClrType::Resolved { .. } => None,
            ClrType::Unresolved { key, .. } => Some(key),
        }
    }

    /// Returns `true` if a definition backs this type
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, ClrType::Resolved { .. })
    }

    /// Full name of the type
    #[must_use]
    pub fn full_name(&self) -> String {
        self.reference().full_name()
    }

    /// Simple name of the type
    #[must_use]
    pub fn name(&self) -> String {
        self.reference().name()
    }

    /// Namespace of the type
    #[must_use]
    pub fn namespace(&self) -> String {
        self.reference().namespace()
    }

    /// Simple name of the assembly that defines, or is expected to define, this type
    #[must_use]
    pub fn assembly_name(&self) -> Option<String> {
        match self {
            ClrType::Resolved { definition, .. } => definition
                .module()
                .and_then(|module| module.assembly())
                .map(|assembly| assembly.identity.name.clone()),
            ClrType::Unresolved { reference, .. } => match reference.element_type() {
                TypeReference::Reference(type_ref) => scope_assembly_name(&type_ref),
                _ => None,
            },
        }
    }

    /// The base type of the definition
    #[must_use]
    pub fn base_type(&self) -> Option<TypeReference> {
        self.definition().and_then(|definition| definition.base_type())
    }

    /// Methods declared by the definition, constructors excluded
    #[must_use]
    pub fn methods(&self) -> Vec<ClrMethod> {
        self.members(|method| !method.is_constructor())
    }

    /// Constructors declared by the definition
    #[must_use]
    pub fn constructors(&self) -> Vec<ClrMethod> {
        self.members(|method| method.is_constructor())
    }

    /// First non-constructor method called `name`
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<ClrMethod> {
        self.methods().into_iter().find(|method| method.name() == name)
    }

    /// Returns `true` if the definition carries an attribute whose type is called `full_name`
    ///
    /// Attribute types are compared by name only; placeholders never carry attributes.
    #[must_use]
    pub fn has_custom_attribute(&self, full_name: &str) -> bool {
        self.definition().is_some_and(|definition| {
            definition.custom_attributes.iter().any(|(_, attribute)| {
                attribute
                    .attribute_type()
                    .is_some_and(|attribute_type| attribute_type.full_name() == full_name)
            })
        })
    }

    fn members(&self, filter: impl Fn(&MethodDefRc) -> bool) -> Vec<ClrMethod> {
        let Some(definition) = self.definition() else {
            return Vec::new();
        };

        definition
            .methods()
            .filter(|method| filter(method))
            .map(|method| ClrMethod {
                definition: method.clone(),
                declaring_type: self.reference().clone(),
            })
            .collect()
    }
}

fn scope_assembly_name(type_ref: &TypeRef) -> Option<String> {
    match &type_ref.scope {
        TypeRefScope::Assembly(identity) => Some(identity.name.clone()),
        TypeRefScope::Nested(outer) => scope_assembly_name(outer),
        TypeRefScope::Module(module) => module
            .upgrade()
            .and_then(|module| module.assembly())
            .map(|assembly| assembly.identity.name.clone()),
    }
}

impl std::fmt::Debug for ClrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClrType::Resolved { reference, .. } => {
                write!(f, "ClrType::Resolved({})", reference.full_name())
            }
            ClrType::Unresolved { key, .. } => write!(f, "ClrType::Unresolved({})", key),
        }
    }
}

/// A method or constructor of a resolved type.
#[derive(Debug, Clone)]
pub struct ClrMethod {
    definition: MethodDefRc,
    declaring_type: TypeReference,
}

impl ClrMethod {
    /// The raw method definition
    #[must_use]
    pub fn definition(&self) -> &MethodDefRc {
        &self.definition
    }

    /// The reference of the type this method was obtained through
    #[must_use]
    pub fn declaring_type(&self) -> &TypeReference {
        &self.declaring_type
    }

    /// Method name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Full name of the method
    #[must_use]
    pub fn full_name(&self) -> String {
        self.definition.full_name()
    }

    /// Returns `true` for constructors
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.definition.is_constructor()
    }

    /// Returns `true` for static methods
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.definition.is_static()
    }

    /// Parameters, in order
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDef] {
        &self.definition.parameters
    }

    /// Return type, `None` for `System.Void`
    #[must_use]
    pub fn return_type(&self) -> Option<&TypeReference> {
        self.definition.return_type.as_ref()
    }
}
