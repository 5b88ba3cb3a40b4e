//! In-memory object model of a .NET metadata graph.
//!
//! This module holds the raw nodes the type system bridges over: assemblies, modules, type
//! definitions and references, generic parameters, methods, fields, and custom attributes.
//! Nodes are shared [`Arc`] allocations linked by weak back-pointers, so a graph can be
//! extended after it was handed out (new types, new attributes) without invalidating any
//! handle held elsewhere.
//!
//! The model never parses bytes. A [`crate::metadata::provider::MetadataProvider`] is
//! responsible for producing these graphs, either from storage or by construction.
//!
//! # Node Identity
//!
//! Two structurally equal references are not guaranteed to be the same node. Caches that must
//! distinguish instances key by [`NodeId`], the address of the node's shared allocation.
//!
//! # Ownership
//!
//! Strong edges only run from owner to owned: assembly to modules, module to types and
//! member references, type to methods, fields and nested types. Signatures, base types,
//! interfaces and attribute constructors point at definitions through the weak
//! [`TypeDefRef`] and [`MethodDefRef`] handles, so dropping the last handle to an assembly
//! releases its whole graph.
//!
//! # Examples
//!
//! ```rust
//! use dotbridge::metadata::{
//!     identity::{AssemblyIdentity, AssemblyVersion},
//!     model::{AssemblyDef, ModuleKind, TypeAttributes, TypeDef},
//! };
//!
//! let identity = AssemblyIdentity::simple("MyLib", AssemblyVersion::new(1, 0, 0, 0));
//! let assembly = AssemblyDef::create(identity, "MyLib.dll", ModuleKind::Dll);
//! let module = assembly.main_module().unwrap();
//!
//! let widget = TypeDef::new("MyLib.Ui", "Widget", TypeAttributes::PUBLIC);
//! module.add_type(&widget)?;
//!
//! assert!(assembly.find_type("MyLib.Ui.Widget").is_some());
//! # Ok::<(), dotbridge::Error>(())
//! ```

mod assembly;
mod attributes;
mod generics;
mod members;
mod types;

use std::sync::{Arc, Weak};

pub use assembly::{AssemblyDef, AssemblyDefRc, ModuleDef, ModuleDefRc, ModuleKind};
pub use attributes::{CustomAttribute, CustomAttributeList};
pub use generics::{GenericOwner, GenericParam, GenericParamOwner, GenericParamRc};
pub use members::{
    FieldAttributes, FieldDef, FieldDefRc, Member, MethodAttributes, MethodDef, MethodDefRc,
    MethodDefRef, MethodRef, MethodRefRc, MethodReference, ParameterDef,
};
pub use types::{
    ArrayType, ArrayTypeRc, GenericInstance, GenericInstanceRc, TypeAttributes, TypeDef,
    TypeDefRc, TypeDefRef, TypeRef, TypeRefRc, TypeRefScope, TypeReference,
};

/// Identity of a raw metadata node.
///
/// This is the address of the node's shared allocation. It is only stable while the node is
/// alive, so anything keyed by a `NodeId` must also keep a clone of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Identity of the node behind `node`
    #[must_use]
    pub fn of<T>(node: &Arc<T>) -> Self {
        NodeId(Arc::as_ptr(node).cast::<()>() as usize)
    }

    /// Identity of the node behind a weak handle, equal to [`NodeId::of`] on the same node
    #[must_use]
    pub fn of_weak<T>(node: &Weak<T>) -> Self {
        NodeId(Weak::as_ptr(node).cast::<()>() as usize)
    }
}

/// Name of the type or method behind `namespace` and `name`, `Namespace.Name` or `Name`
pub(crate) fn join_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}
