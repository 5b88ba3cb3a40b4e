//! Generic parameters and their owners.

use std::sync::{Arc, OnceLock, Weak};

use crate::{
    metadata::model::{
        assembly::ModuleDefRc,
        members::{MethodDef, MethodRef, MethodReference},
        types::{TypeDef, TypeRef, TypeReference},
    },
    Result,
};

/// Reference to a `GenericParam`
pub type GenericParamRc = Arc<GenericParam>;

/// Back-pointer from a generic parameter to the member declaring it.
#[derive(Debug, Clone)]
pub enum GenericParamOwner {
    /// Declared on a type definition
    TypeDef(Weak<TypeDef>),
    /// Declared on a referenced type
    TypeRef(Weak<TypeRef>),
    /// Declared on a method definition
    MethodDef(Weak<MethodDef>),
    /// Declared on a referenced method
    MethodRef(Weak<MethodRef>),
}

/// The live owner of a generic parameter, either a type or a method.
#[derive(Debug, Clone)]
pub enum GenericOwner {
    /// The parameter belongs to a type
    Type(TypeReference),
    /// The parameter belongs to a method
    Method(MethodReference),
}

impl GenericParamOwner {
    /// Upgrade the back-pointer, `None` once the owner has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<GenericOwner> {
        match self {
            GenericParamOwner::TypeDef(owner) => owner
                .upgrade()
                .map(|owner| GenericOwner::Type(TypeReference::from(owner))),
            GenericParamOwner::TypeRef(owner) => owner
                .upgrade()
                .map(|owner| GenericOwner::Type(TypeReference::Reference(owner))),
            GenericParamOwner::MethodDef(owner) => owner
                .upgrade()
                .map(|owner| GenericOwner::Method(MethodReference::from(owner))),
            GenericParamOwner::MethodRef(owner) => owner
                .upgrade()
                .map(|owner| GenericOwner::Method(MethodReference::Reference(owner))),
        }
    }
}

/// A generic parameter such as `T` in ``List`1<T>`` or ``M<T>()``.
///
/// Generic parameters never resolve to a definition. Two parameter nodes are considered the
/// same parameter when their names and their owners' names agree.
pub struct GenericParam {
    /// Parameter name
    pub name: String,
    /// Zero based position in the owner's parameter list
    pub position: u16,
    owner: OnceLock<GenericParamOwner>,
}

impl GenericParam {
    /// Create a parameter without an owner
    #[must_use]
    pub fn new(name: impl Into<String>, position: u16) -> GenericParamRc {
        Arc::new(GenericParam {
            name: name.into(),
            position,
            owner: OnceLock::new(),
        })
    }

    /// Full name of a generic parameter is its name
    #[must_use]
    pub fn full_name(&self) -> String {
        self.name.clone()
    }

    /// The raw back-pointer to the declaring member, if one was ever set
    #[must_use]
    pub fn owner_handle(&self) -> Option<&GenericParamOwner> {
        self.owner.get()
    }

    /// The declaring type or method, `None` if detached or the owner is gone
    #[must_use]
    pub fn owner(&self) -> Option<GenericOwner> {
        self.owner.get().and_then(GenericParamOwner::upgrade)
    }

    pub(crate) fn set_owner(&self, owner: GenericParamOwner) -> Result<()> {
        self.owner
            .set(owner)
            .map_err(|_| malformed_error!("Generic parameter '{}' already has an owner", self.name))
    }

    /// The module of the declaring member
    #[must_use]
    pub fn module(&self) -> Option<ModuleDefRc> {
        match self.owner()? {
            GenericOwner::Type(owner) => owner.module(),
            GenericOwner::Method(owner) => owner.module(),
        }
    }
}

impl std::fmt::Debug for GenericParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericParam")
            .field("name", &self.name)
            .field("position", &self.position)
            .finish()
    }
}
