//! Methods, method references, fields, and the `Member` view used for attribute injection.

use std::sync::{Arc, OnceLock, Weak};

use bitflags::bitflags;

use crate::{
    metadata::model::{
        assembly::ModuleDefRc,
        attributes::CustomAttributeList,
        generics::{GenericParamOwner, GenericParamRc},
        types::{TypeDef, TypeDefRc, TypeRefRc, TypeRefScope, TypeReference},
        ModuleDef, NodeId,
    },
    Result,
};

/// Reference to a `MethodDef`
pub type MethodDefRc = Arc<MethodDef>;
/// Reference to a `MethodRef`
pub type MethodRefRc = Arc<MethodRef>;
/// Reference to a `FieldDef`
pub type FieldDefRc = Arc<FieldDef>;

const VOID: &str = "System.Void";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Method attributes, §II.23.1.10
    pub struct MethodAttributes: u32 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by all types in the assembly
        const ASSEMBLY = 0x0003;
        /// Accessible by everyone
        const PUBLIC = 0x0006;
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name+sig, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// The runtime checks the name encoding
        const RT_SPECIAL_NAME = 0x1000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Field attributes, §II.23.1.5
    pub struct FieldAttributes: u32 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by all types in the assembly
        const ASSEMBLY = 0x0003;
        /// Accessible by everyone
        const PUBLIC = 0x0006;
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Field can only be initialized
        const INIT_ONLY = 0x0020;
        /// Value is a compile time constant
        const LITERAL = 0x0040;
    }
}

/// A named method parameter
#[derive(Debug, Clone)]
pub struct ParameterDef {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub parameter_type: TypeReference,
}

impl ParameterDef {
    /// Create a parameter
    pub fn new(name: impl Into<String>, parameter_type: TypeReference) -> Self {
        ParameterDef {
            name: name.into(),
            parameter_type,
        }
    }
}

fn signature_name(
    return_type: Option<&TypeReference>,
    declaring_type: &str,
    name: &str,
    parameters: impl Iterator<Item = String>,
) -> String {
    format!(
        "{} {}::{}({})",
        return_type.map_or_else(|| VOID.to_string(), TypeReference::full_name),
        declaring_type,
        name,
        parameters.collect::<Vec<_>>().join(",")
    )
}

/// A method declared on a type definition.
pub struct MethodDef {
    /// Method name, `.ctor` and `.cctor` for constructors
    pub name: String,
    /// Flags
    pub flags: MethodAttributes,
    /// Return type, `None` for `System.Void`
    pub return_type: Option<TypeReference>,
    /// Parameters, in order
    pub parameters: Vec<ParameterDef>,
    declaring_type: OnceLock<Weak<TypeDef>>,
    generic_params: boxcar::Vec<GenericParamRc>,
    /// All custom attributes this method has
    pub custom_attributes: CustomAttributeList,
}

impl MethodDef {
    /// Create a detached method
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        flags: MethodAttributes,
        return_type: Option<TypeReference>,
        parameters: Vec<ParameterDef>,
    ) -> MethodDefRc {
        Arc::new(MethodDef {
            name: name.into(),
            flags,
            return_type,
            parameters,
            declaring_type: OnceLock::new(),
            generic_params: boxcar::Vec::new(),
            custom_attributes: boxcar::Vec::new(),
        })
    }

    /// Create a detached instance constructor
    #[must_use]
    pub fn constructor(flags: MethodAttributes, parameters: Vec<ParameterDef>) -> MethodDefRc {
        Self::new(
            ".ctor",
            flags
                | MethodAttributes::HIDE_BY_SIG
                | MethodAttributes::SPECIAL_NAME
                | MethodAttributes::RT_SPECIAL_NAME,
            None,
            parameters,
        )
    }

    pub(crate) fn attach_to_type(&self, owner: &Arc<TypeDef>) -> Result<()> {
        self.declaring_type
            .set(Arc::downgrade(owner))
            .map_err(|_| malformed_error!("Method '{}' is already attached to a type", self.name))
    }

    /// The type declaring this method
    #[must_use]
    pub fn declaring_type(&self) -> Option<TypeDefRc> {
        self.declaring_type.get().and_then(Weak::upgrade)
    }

    /// The module of the declaring type
    #[must_use]
    pub fn module(&self) -> Option<ModuleDefRc> {
        self.declaring_type().and_then(|owner| owner.module())
    }

    /// Returns `true` for instance and static constructors
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.flags.contains(MethodAttributes::RT_SPECIAL_NAME)
            && (self.name == ".ctor" || self.name == ".cctor")
    }

    /// Returns `true` for static methods
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodAttributes::STATIC)
    }

    /// Full name, `ReturnType DeclaringType::Name(ParameterTypes)`
    #[must_use]
    pub fn full_name(&self) -> String {
        signature_name(
            self.return_type.as_ref(),
            &self
                .declaring_type()
                .map(|owner| owner.full_name())
                .unwrap_or_default(),
            &self.name,
            self.parameters
                .iter()
                .map(|parameter| parameter.parameter_type.full_name()),
        )
    }

    /// Declare a generic parameter on this method
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the parameter already has an owner.
    pub fn add_generic_param(self: &Arc<Self>, param: &GenericParamRc) -> Result<()> {
        param.set_owner(GenericParamOwner::MethodDef(Arc::downgrade(self)))?;
        self.generic_params.push(param.clone());
        Ok(())
    }

    /// Generic parameters of this method, in declaration order
    pub fn generic_params(&self) -> impl Iterator<Item = &GenericParamRc> {
        self.generic_params.iter().map(|(_, param)| param)
    }
}

impl std::fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDef")
            .field("full_name", &self.full_name())
            .field("flags", &self.flags)
            .finish()
    }
}

/// A by-signature reference to a method, typically one defined in another module.
pub struct MethodRef {
    /// Method name
    pub name: String,
    /// Type declaring the referenced method
    pub declaring_type: TypeReference,
    /// Return type, `None` for `System.Void`
    pub return_type: Option<TypeReference>,
    /// Parameter types, in order
    pub parameters: Vec<TypeReference>,
    module: OnceLock<Weak<ModuleDef>>,
    generic_params: boxcar::Vec<GenericParamRc>,
}

impl MethodRef {
    /// Create a method reference not owned by any module yet
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        declaring_type: TypeReference,
        return_type: Option<TypeReference>,
        parameters: Vec<TypeReference>,
    ) -> MethodRefRc {
        Arc::new(MethodRef {
            name: name.into(),
            declaring_type,
            return_type,
            parameters,
            module: OnceLock::new(),
            generic_params: boxcar::Vec::new(),
        })
    }

    /// Record the module this reference belongs to
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the reference already belongs to a module.
    pub fn set_module(&self, module: &ModuleDefRc) -> Result<()> {
        self.module
            .set(Arc::downgrade(module))
            .map_err(|_| malformed_error!("Method reference '{}' already has a module", self.name))
    }

    /// The module this reference was created in
    #[must_use]
    pub fn module(&self) -> Option<ModuleDefRc> {
        self.module.get().and_then(Weak::upgrade)
    }

    /// Full name, `ReturnType DeclaringType::Name(ParameterTypes)`
    #[must_use]
    pub fn full_name(&self) -> String {
        signature_name(
            self.return_type.as_ref(),
            &self.declaring_type.full_name(),
            &self.name,
            self.parameters.iter().map(TypeReference::full_name),
        )
    }

    /// Declare a generic parameter on the referenced method
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the parameter already has an owner.
    pub fn add_generic_param(self: &Arc<Self>, param: &GenericParamRc) -> Result<()> {
        param.set_owner(GenericParamOwner::MethodRef(Arc::downgrade(self)))?;
        self.generic_params.push(param.clone());
        Ok(())
    }
}

impl std::fmt::Debug for MethodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRef")
            .field("full_name", &self.full_name())
            .finish()
    }
}

/// A weak handle to a [`MethodDef`], the counterpart of [`crate::metadata::model::TypeDefRef`].
#[derive(Clone)]
pub struct MethodDefRef {
    weak_ref: Weak<MethodDef>,
}

impl MethodDefRef {
    /// Create a handle to `method`
    #[must_use]
    pub fn new(method: &MethodDefRc) -> Self {
        MethodDefRef {
            weak_ref: Arc::downgrade(method),
        }
    }

    /// The method, `None` once it has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<MethodDefRc> {
        self.weak_ref.upgrade()
    }

    /// Returns `true` while the method is alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Identity of the method, stable for as long as this handle exists
    #[must_use]
    pub fn id(&self) -> NodeId {
        NodeId::of_weak(&self.weak_ref)
    }
}

impl std::fmt::Debug for MethodDefRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDefRef")
            .field("full_name", &self.upgrade().map(|method| method.full_name()))
            .finish()
    }
}

/// Either a method definition or a method reference.
#[derive(Clone)]
pub enum MethodReference {
    /// A method declared in a loaded module, held weakly
    Definition(MethodDefRef),
    /// A by-signature reference
    Reference(MethodRefRc),
}

impl MethodReference {
    /// Identity of the node behind this reference
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            MethodReference::Definition(node) => node.id(),
            MethodReference::Reference(node) => NodeId::of(node),
        }
    }

    /// Method name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            MethodReference::Definition(method) => method
                .upgrade()
                .map(|method| method.name.clone())
                .unwrap_or_default(),
            MethodReference::Reference(method) => method.name.clone(),
        }
    }

    /// Full name, `ReturnType DeclaringType::Name(ParameterTypes)`
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            MethodReference::Definition(method) => method
                .upgrade()
                .map(|method| method.full_name())
                .unwrap_or_default(),
            MethodReference::Reference(method) => method.full_name(),
        }
    }

    /// The declaring type, `None` for a method definition that is not attached to a type
    #[must_use]
    pub fn declaring_type(&self) -> Option<TypeReference> {
        match self {
            MethodReference::Definition(method) => method
                .upgrade()
                .and_then(|method| method.declaring_type())
                .map(TypeReference::from),
            MethodReference::Reference(method) => Some(method.declaring_type.clone()),
        }
    }

    /// Return type, `None` for `System.Void`
    #[must_use]
    pub fn return_type(&self) -> Option<TypeReference> {
        match self {
            MethodReference::Definition(method) => method
                .upgrade()
                .and_then(|method| method.return_type.clone()),
            MethodReference::Reference(method) => method.return_type.clone(),
        }
    }

    /// Parameter types, in order
    #[must_use]
    pub fn parameter_types(&self) -> Vec<TypeReference> {
        match self {
            MethodReference::Definition(method) => method
                .upgrade()
                .map(|method| {
                    method
                        .parameters
                        .iter()
                        .map(|parameter| parameter.parameter_type.clone())
                        .collect()
                })
                .unwrap_or_default(),
            MethodReference::Reference(method) => method.parameters.clone(),
        }
    }

    /// The module this method lives in or was imported into
    #[must_use]
    pub fn module(&self) -> Option<ModuleDefRc> {
        match self {
            MethodReference::Definition(method) => {
                method.upgrade().and_then(|method| method.module())
            }
            MethodReference::Reference(method) => method.module(),
        }
    }

    /// The definition, if this reference is one and it is still alive
    #[must_use]
    pub fn as_definition(&self) -> Option<MethodDefRc> {
        match self {
            MethodReference::Definition(method) => method.upgrade(),
            MethodReference::Reference(_) => None,
        }
    }
}

impl std::fmt::Debug for MethodReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MethodReference({})", self.full_name())
    }
}

impl From<&MethodDefRc> for MethodReference {
    fn from(method: &MethodDefRc) -> Self {
        MethodReference::Definition(MethodDefRef::new(method))
    }
}

impl From<MethodDefRc> for MethodReference {
    fn from(method: MethodDefRc) -> Self {
        MethodReference::from(&method)
    }
}

impl From<MethodRefRc> for MethodReference {
    fn from(method: MethodRefRc) -> Self {
        MethodReference::Reference(method)
    }
}

/// A field declared on a type definition.
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Flags
    pub flags: FieldAttributes,
    /// Field type
    pub field_type: TypeReference,
    declaring_type: OnceLock<Weak<TypeDef>>,
    /// All custom attributes this field has
    pub custom_attributes: CustomAttributeList,
}

impl FieldDef {
    /// Create a detached field
    #[must_use]
    pub fn new(name: impl Into<String>, flags: FieldAttributes, field_type: TypeReference) -> FieldDefRc {
        Arc::new(FieldDef {
            name: name.into(),
            flags,
            field_type,
            declaring_type: OnceLock::new(),
            custom_attributes: boxcar::Vec::new(),
        })
    }

    pub(crate) fn attach_to_type(&self, owner: &Arc<TypeDef>) -> Result<()> {
        self.declaring_type
            .set(Arc::downgrade(owner))
            .map_err(|_| malformed_error!("Field '{}' is already attached to a type", self.name))
    }

    /// The type declaring this field
    #[must_use]
    pub fn declaring_type(&self) -> Option<TypeDefRc> {
        self.declaring_type.get().and_then(Weak::upgrade)
    }

    /// The module of the declaring type
    #[must_use]
    pub fn module(&self) -> Option<ModuleDefRc> {
        self.declaring_type().and_then(|owner| owner.module())
    }

    /// Full name, `FieldType DeclaringType::Name`
    #[must_use]
    pub fn full_name(&self) -> String {
        format!(
            "{} {}::{}",
            self.field_type.full_name(),
            self.declaring_type()
                .map(|owner| owner.full_name())
                .unwrap_or_default(),
            self.name
        )
    }
}

impl std::fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDef")
            .field("full_name", &self.full_name())
            .field("flags", &self.flags)
            .finish()
    }
}

/// Any member a compiler-generated marker may be requested for.
///
/// Only definitions carry custom attributes; references are accepted here so callers can
/// hand over whatever they hold and get a precise error back.
#[derive(Debug, Clone)]
pub enum Member {
    /// A type definition
    TypeDef(TypeDefRc),
    /// A type reference
    TypeRef(TypeRefRc),
    /// A method definition
    MethodDef(MethodDefRc),
    /// A method reference
    MethodRef(MethodRefRc),
    /// A field definition
    Field(FieldDefRc),
}

impl Member {
    /// The attribute list of this member, `None` if it cannot carry attributes
    #[must_use]
    pub fn custom_attributes(&self) -> Option<&CustomAttributeList> {
        match self {
            Member::TypeDef(type_def) => Some(&type_def.custom_attributes),
            Member::MethodDef(method) => Some(&method.custom_attributes),
            Member::Field(field) => Some(&field.custom_attributes),
            Member::TypeRef(_) | Member::MethodRef(_) => None,
        }
    }

    /// The enclosing type of this member
    #[must_use]
    pub fn declaring_type(&self) -> Option<TypeReference> {
        match self {
            Member::TypeDef(type_def) => type_def.declaring_type().map(TypeReference::from),
            Member::TypeRef(type_ref) => match &type_ref.scope {
                TypeRefScope::Nested(outer) => Some(TypeReference::Reference(outer.clone())),
                _ => None,
            },
            Member::MethodDef(method) => method.declaring_type().map(TypeReference::from),
            Member::MethodRef(method) => Some(method.declaring_type.clone()),
            Member::Field(field) => field.declaring_type().map(TypeReference::from),
        }
    }

    /// The module this member lives in
    #[must_use]
    pub fn module(&self) -> Option<ModuleDefRc> {
        match self {
            Member::TypeDef(type_def) => type_def.module(),
            Member::TypeRef(type_ref) => type_ref.module(),
            Member::MethodDef(method) => method.module(),
            Member::MethodRef(method) => method.module(),
            Member::Field(field) => field.module(),
        }
    }

    /// Returns `true` for types
    #[must_use]
    pub fn is_type(&self) -> bool {
        matches!(self, Member::TypeDef(_) | Member::TypeRef(_))
    }

    /// Full name of the member
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            Member::TypeDef(type_def) => type_def.full_name(),
            Member::TypeRef(type_ref) => type_ref.full_name(),
            Member::MethodDef(method) => method.full_name(),
            Member::MethodRef(method) => method.full_name(),
            Member::Field(field) => field.full_name(),
        }
    }
}

impl From<TypeDefRc> for Member {
    fn from(type_def: TypeDefRc) -> Self {
        Member::TypeDef(type_def)
    }
}

impl From<MethodDefRc> for Member {
    fn from(method: MethodDefRc) -> Self {
        Member::MethodDef(method)
    }
}

impl From<FieldDefRc> for Member {
    fn from(field: FieldDefRc) -> Self {
        Member::Field(field)
    }
}

impl From<MethodRefRc> for Member {
    fn from(method: MethodRefRc) -> Self {
        Member::MethodRef(method)
    }
}

impl From<TypeRefRc> for Member {
    fn from(type_ref: TypeRefRc) -> Self {
        Member::TypeRef(type_ref)
    }
}
