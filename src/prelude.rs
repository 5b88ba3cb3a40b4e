//! # dotbridge Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dotbridge library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotbridge operations
pub use crate::Error;

/// The result type used throughout dotbridge
pub use crate::Result;

// ================================================================================================
// Type System
// ================================================================================================

/// Facade and loader
pub use crate::typesystem::{TypeSystem, TypeSystemLoader};

/// Abstract types handed to the code generator
pub use crate::typesystem::{ClrMethod, ClrType, ClrTypeRc};

/// Registered assemblies and generated members
pub use crate::typesystem::{
    Assembly, AssemblyRc, CompilerGeneratedMarker, TypeBuilder, COMPILER_GENERATED_ATTRIBUTE,
};

// ================================================================================================
// Metadata
// ================================================================================================

/// Assembly identities
pub use crate::metadata::identity::{AssemblyIdentity, AssemblyVersion, HashAlgorithm, Identity};

/// Raw metadata graph
pub use crate::metadata::model::{
    AssemblyDef, AssemblyDefRc, CustomAttribute, FieldAttributes, FieldDef, FieldDefRc,
    GenericInstance, GenericParam, Member, MethodAttributes, MethodDef, MethodDefRc,
    MethodDefRef, MethodReference, ModuleDef, ModuleDefRc, ModuleKind, ParameterDef,
    TypeAttributes, TypeDef, TypeDefRc, TypeDefRef, TypeRef, TypeRefScope, TypeReference,
};

/// Metadata backends
pub use crate::metadata::provider::{
    AssemblyResolver, MemoryProvider, MetadataProvider, ReaderOptions,
};
