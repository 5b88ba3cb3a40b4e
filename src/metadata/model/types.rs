//! Type definitions, type references and constructed types.

use std::sync::{Arc, OnceLock, Weak};

use bitflags::bitflags;

use crate::{
    metadata::{
        identity::AssemblyIdentity,
        model::{
            assembly::ModuleDefRc,
            attributes::CustomAttributeList,
            generics::{GenericParamOwner, GenericParamRc},
            join_name,
            members::{FieldDefRc, MethodDefRc},
            ModuleDef, NodeId,
        },
    },
    Result,
};

/// Reference to a `TypeDef`
pub type TypeDefRc = Arc<TypeDef>;
/// Reference to a `TypeRef`
pub type TypeRefRc = Arc<TypeRef>;
/// Reference to a `GenericInstance`
pub type GenericInstanceRc = Arc<GenericInstance>;
/// Reference to an `ArrayType`
pub type ArrayTypeRc = Arc<ArrayType>;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Type attributes, §II.23.1.15
    pub struct TypeAttributes: u32 {
        /// Class is public scope
        const PUBLIC = 0x0000_0001;
        /// Class is nested with public visibility
        const NESTED_PUBLIC = 0x0000_0002;
        /// Class is nested with private visibility
        const NESTED_PRIVATE = 0x0000_0003;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Class is abstract
        const ABSTRACT = 0x0000_0080;
        /// Class cannot be extended
        const SEALED = 0x0000_0100;
        /// Class name is special
        const SPECIAL_NAME = 0x0000_0400;
        /// Initialize the class before first static field access
        const BEFORE_FIELD_INIT = 0x0010_0000;
    }
}

/// A type declared in a module, the target of type resolution.
pub struct TypeDef {
    /// `TypeNamespace`, empty for nested types and the global namespace
    pub namespace: String,
    /// `TypeName`
    pub name: String,
    /// Flags
    pub flags: TypeAttributes,
    /// Owning module, unset for nested types
    module: OnceLock<Weak<ModuleDef>>,
    /// Enclosing type of a nested type
    declaring_type: OnceLock<Weak<TypeDef>>,
    /// This types base aka 'extends'
    base: OnceLock<TypeReference>,
    /// All interfaces this type implements
    pub interfaces: boxcar::Vec<TypeReference>,
    methods: boxcar::Vec<MethodDefRc>,
    fields: boxcar::Vec<FieldDefRc>,
    nested_types: boxcar::Vec<TypeDefRc>,
    generic_params: boxcar::Vec<GenericParamRc>,
    /// All custom attributes this type has
    pub custom_attributes: CustomAttributeList,
}

impl TypeDef {
    /// Create a detached type definition
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, flags: TypeAttributes) -> TypeDefRc {
        Arc::new(TypeDef {
            namespace: namespace.into(),
            name: name.into(),
            flags,
            module: OnceLock::new(),
            declaring_type: OnceLock::new(),
            base: OnceLock::new(),
            interfaces: boxcar::Vec::new(),
            methods: boxcar::Vec::new(),
            fields: boxcar::Vec::new(),
            nested_types: boxcar::Vec::new(),
            generic_params: boxcar::Vec::new(),
            custom_attributes: boxcar::Vec::new(),
        })
    }

    /// Full name, `Namespace.Name` or `Namespace.Outer/Name` for nested types
    #[must_use]
    pub fn full_name(&self) -> String {
        match self.declaring_type() {
            Some(outer) => format!("{}/{}", outer.full_name(), self.name),
            None => join_name(&self.namespace, &self.name),
        }
    }

    /// The module this type lives in, through the enclosing type for nested types
    #[must_use]
    pub fn module(&self) -> Option<ModuleDefRc> {
        match self.module.get().and_then(Weak::upgrade) {
            Some(module) => Some(module),
            None => self.declaring_type().and_then(|outer| outer.module()),
        }
    }

    pub(crate) fn attach_to_module(&self, module: &ModuleDefRc) -> Result<()> {
        if self.declaring_type.get().is_some() {
            return Err(malformed_error!("Type '{}' is nested", self.full_name()));
        }
        self.module
            .set(Arc::downgrade(module))
            .map_err(|_| malformed_error!("Type '{}' is already attached", self.full_name()))
    }

    /// The enclosing type of a nested type
    #[must_use]
    pub fn declaring_type(&self) -> Option<TypeDefRc> {
        self.declaring_type.get().and_then(Weak::upgrade)
    }

    /// The base type, if one has been set
    #[must_use]
    pub fn base_type(&self) -> Option<TypeReference> {
        self.base.get().cloned()
    }

    /// Set the base type, once
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a base type was already set.
    pub fn set_base_type(&self, base: TypeReference) -> Result<()> {
        self.base
            .set(base)
            .map_err(|_| malformed_error!("Type '{}' already has a base type", self.full_name()))
    }

    /// Attach a method to this type
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the method already has a declaring type.
    pub fn add_method(self: &Arc<Self>, method: &MethodDefRc) -> Result<()> {
        method.attach_to_type(self)?;
        self.methods.push(method.clone());
        Ok(())
    }

    /// All methods, constructors included
    pub fn methods(&self) -> impl Iterator<Item = &MethodDefRc> {
        self.methods.iter().map(|(_, method)| method)
    }

    /// Instance and static constructors
    pub fn constructors(&self) -> impl Iterator<Item = &MethodDefRc> {
        self.methods().filter(|method| method.is_constructor())
    }

    /// Attach a field to this type
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the field already has a declaring type.
    pub fn add_field(self: &Arc<Self>, field: &FieldDefRc) -> Result<()> {
        field.attach_to_type(self)?;
        self.fields.push(field.clone());
        Ok(())
    }

    /// All fields
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefRc> {
        self.fields.iter().map(|(_, field)| field)
    }

    /// Nest `nested` inside this type
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `nested` is already attached to a module or type.
    pub fn add_nested_type(self: &Arc<Self>, nested: &TypeDefRc) -> Result<()> {
        if nested.module.get().is_some() {
            return Err(malformed_error!(
                "Type '{}' is already attached to a module",
                nested.full_name()
            ));
        }
        nested
            .declaring_type
            .set(Arc::downgrade(self))
            .map_err(|_| malformed_error!("Type '{}' is already nested", nested.name))?;
        self.nested_types.push(nested.clone());
        Ok(())
    }

    /// Types nested directly inside this type
    pub fn nested_types(&self) -> impl Iterator<Item = &TypeDefRc> {
        self.nested_types.iter().map(|(_, nested)| nested)
    }

    /// Find a directly nested type by simple name
    #[must_use]
    pub fn find_nested(&self, name: &str) -> Option<TypeDefRc> {
        self.nested_types().find(|nested| nested.name == name).cloned()
    }

    /// Declare a generic parameter on this type
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the parameter already has an owner.
    pub fn add_generic_param(self: &Arc<Self>, param: &GenericParamRc) -> Result<()> {
        param.set_owner(GenericParamOwner::TypeDef(Arc::downgrade(self)))?;
        self.generic_params.push(param.clone());
        Ok(())
    }

    /// Generic parameters of this type, in declaration order
    pub fn generic_params(&self) -> impl Iterator<Item = &GenericParamRc> {
        self.generic_params.iter().map(|(_, param)| param)
    }
}

impl std::fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDef")
            .field("full_name", &self.full_name())
            .field("flags", &self.flags)
            .finish()
    }
}

/// A weak handle to a [`TypeDef`].
///
/// Used wherever a definition is referred to without being owned. Upgrading fails once
/// every owner of the definition has been dropped.
#[derive(Clone)]
pub struct TypeDefRef {
    weak_ref: Weak<TypeDef>,
}

impl TypeDefRef {
    /// Create a handle to `type_def`
    #[must_use]
    pub fn new(type_def: &TypeDefRc) -> Self {
        TypeDefRef {
            weak_ref: Arc::downgrade(type_def),
        }
    }

    /// The definition, `None` once it has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<TypeDefRc> {
        self.weak_ref.upgrade()
    }

    /// Returns `true` while the definition is alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Identity of the definition, stable for as long as this handle exists
    #[must_use]
    pub fn id(&self) -> NodeId {
        NodeId::of_weak(&self.weak_ref)
    }

    /// Simple name of the definition
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.upgrade().map(|type_def| type_def.name.clone())
    }

    /// Namespace of the definition
    #[must_use]
    pub fn namespace(&self) -> Option<String> {
        self.upgrade().map(|type_def| type_def.namespace.clone())
    }

    /// Full name of the definition
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        self.upgrade().map(|type_def| type_def.full_name())
    }
}

impl std::fmt::Debug for TypeDefRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDefRef")
            .field("full_name", &self.full_name())
            .finish()
    }
}

/// Where a type reference points to.
#[derive(Debug, Clone)]
pub enum TypeRefScope {
    /// A type defined in another assembly
    Assembly(AssemblyIdentity),
    /// A type defined in a module of the same assembly
    Module(Weak<ModuleDef>),
    /// A type nested inside another referenced type
    Nested(TypeRefRc),
}

/// A reference to a type by name, resolved lazily through its scope.
pub struct TypeRef {
    /// `TypeNamespace`
    pub namespace: String,
    /// `TypeName`
    pub name: String,
    /// Resolution scope
    pub scope: TypeRefScope,
    /// The module this reference was created in
    module: OnceLock<Weak<ModuleDef>>,
    generic_params: boxcar::Vec<GenericParamRc>,
}

impl TypeRef {
    /// Create a type reference that is not owned by any module yet
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, scope: TypeRefScope) -> TypeRefRc {
        Arc::new(TypeRef {
            namespace: namespace.into(),
            name: name.into(),
            scope,
            module: OnceLock::new(),
            generic_params: boxcar::Vec::new(),
        })
    }

    /// Full name, `Namespace.Name` or `Namespace.Outer/Name` for nested references
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.scope {
            TypeRefScope::Nested(outer) => format!("{}/{}", outer.full_name(), self.name),
            _ => join_name(&self.namespace, &self.name),
        }
    }

    /// Record the module this reference belongs to
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the reference already belongs to a module.
    pub fn set_module(&self, module: &ModuleDefRc) -> Result<()> {
        self.module.set(Arc::downgrade(module)).map_err(|_| {
            malformed_error!("Type reference '{}' already has a module", self.full_name())
        })
    }

    /// The module this reference was created in
    #[must_use]
    pub fn module(&self) -> Option<ModuleDefRc> {
        self.module.get().and_then(Weak::upgrade)
    }

    /// Declare a generic parameter on the referenced type
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the parameter already has an owner.
    pub fn add_generic_param(self: &Arc<Self>, param: &GenericParamRc) -> Result<()> {
        param.set_owner(GenericParamOwner::TypeRef(Arc::downgrade(self)))?;
        self.generic_params.push(param.clone());
        Ok(())
    }

    /// Generic parameters of the referenced type
    pub fn generic_params(&self) -> impl Iterator<Item = &GenericParamRc> {
        self.generic_params.iter().map(|(_, param)| param)
    }
}

impl std::fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRef")
            .field("full_name", &self.full_name())
            .field("scope", &self.scope)
            .finish()
    }
}

/// A generic type instantiated with type arguments, e.g. ``List`1<System.String>``.
pub struct GenericInstance {
    /// The open generic type
    pub element: TypeReference,
    /// Type arguments, in parameter order
    pub arguments: Vec<TypeReference>,
}

impl GenericInstance {
    /// Instantiate `element` with `arguments`
    #[must_use]
    pub fn new(element: TypeReference, arguments: Vec<TypeReference>) -> TypeReference {
        TypeReference::GenericInstance(Arc::new(GenericInstance { element, arguments }))
    }
}

/// An array of `element` with `rank` dimensions.
pub struct ArrayType {
    /// Element type
    pub element: TypeReference,
    /// Number of dimensions, 1 for vectors
    pub rank: u32,
}

impl ArrayType {
    /// Create an array type of `element`
    #[must_use]
    pub fn new(element: TypeReference, rank: u32) -> TypeReference {
        TypeReference::Array(Arc::new(ArrayType { element, rank }))
    }
}

/// Any node that denotes a type.
///
/// Cloning a `TypeReference` clones the handle, not the node: the clone has the same
/// [`NodeId`]. Definitions are held weakly, see [`TypeDefRef`].
#[derive(Clone)]
pub enum TypeReference {
    /// A type definition, which resolves to itself
    Definition(TypeDefRef),
    /// A by-name reference, resolved through its scope
    Reference(TypeRefRc),
    /// A generic parameter of a type or method
    GenericParameter(GenericParamRc),
    /// A generic instantiation
    GenericInstance(GenericInstanceRc),
    /// An array type
    Array(ArrayTypeRc),
}

impl TypeReference {
    /// Identity of the node behind this reference
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            TypeReference::Definition(node) => node.id(),
            TypeReference::Reference(node) => NodeId::of(node),
            TypeReference::GenericParameter(node) => NodeId::of(node),
            TypeReference::GenericInstance(node) => NodeId::of(node),
            TypeReference::Array(node) => NodeId::of(node),
        }
    }

    /// Full name of the denoted type
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            TypeReference::Definition(type_def) => type_def.full_name().unwrap_or_default(),
            TypeReference::Reference(type_ref) => type_ref.full_name(),
            TypeReference::GenericParameter(param) => param.full_name(),
            TypeReference::GenericInstance(instance) => format!(
                "{}<{}>",
                instance.element.full_name(),
                instance
                    .arguments
                    .iter()
                    .map(TypeReference::full_name)
                    .collect::<Vec<_>>()
                    .join(",")
            ),
            TypeReference::Array(array) => format!(
                "{}[{}]",
                array.element.full_name(),
                ",".repeat(array.rank.saturating_sub(1) as usize)
            ),
        }
    }

    /// Simple name, without namespace or enclosing type
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            TypeReference::Definition(type_def) => type_def.name().unwrap_or_default(),
            TypeReference::Reference(type_ref) => type_ref.name.clone(),
            TypeReference::GenericParameter(param) => param.name.clone(),
            TypeReference::GenericInstance(instance) => instance.element.name(),
            TypeReference::Array(array) => format!(
                "{}[{}]",
                array.element.name(),
                ",".repeat(array.rank.saturating_sub(1) as usize)
            ),
        }
    }

    /// Namespace of the denoted type, empty for generic parameters
    #[must_use]
    pub fn namespace(&self) -> String {
        match self {
            TypeReference::Definition(type_def) => type_def.namespace().unwrap_or_default(),
            TypeReference::Reference(type_ref) => type_ref.namespace.clone(),
            TypeReference::GenericParameter(_) => String::new(),
            TypeReference::GenericInstance(instance) => instance.element.namespace(),
            TypeReference::Array(array) => array.element.namespace(),
        }
    }

    /// The module this reference lives in
    #[must_use]
    pub fn module(&self) -> Option<ModuleDefRc> {
        match self {
            TypeReference::Definition(type_def) => {
                type_def.upgrade().and_then(|type_def| type_def.module())
            }
            TypeReference::Reference(type_ref) => type_ref.module(),
            TypeReference::GenericParameter(param) => param.module(),
            TypeReference::GenericInstance(instance) => instance.element.module(),
            TypeReference::Array(array) => array.element.module(),
        }
    }

    /// The innermost element of constructed types, the reference itself otherwise
    #[must_use]
    pub fn element_type(&self) -> TypeReference {
        match self {
            TypeReference::GenericInstance(instance) => instance.element.element_type(),
            TypeReference::Array(array) => array.element.element_type(),
            _ => self.clone(),
        }
    }

    /// The definition, if this reference is one and it is still alive
    #[must_use]
    pub fn as_definition(&self) -> Option<TypeDefRc> {
        match self {
            TypeReference::Definition(type_def) => type_def.upgrade(),
            _ => None,
        }
    }

    /// Returns `true` if this reference is a generic parameter
    #[must_use]
    pub fn is_generic_parameter(&self) -> bool {
        matches!(self, TypeReference::GenericParameter(_))
    }
}

impl std::fmt::Debug for TypeReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeReference({})", self.full_name())
    }
}

impl From<&TypeDefRc> for TypeReference {
    fn from(type_def: &TypeDefRc) -> Self {
        TypeReference::Definition(TypeDefRef::new(type_def))
    }
}

impl From<TypeDefRc> for TypeReference {
    fn from(type_def: TypeDefRc) -> Self {
        TypeReference::from(&type_def)
    }
}

impl From<TypeRefRc> for TypeReference {
    fn from(type_ref: TypeRefRc) -> Self {
        TypeReference::Reference(type_ref)
    }
}

impl From<GenericParamRc> for TypeReference {
    fn from(param: GenericParamRc) -> Self {
        TypeReference::GenericParameter(param)
    }
}
