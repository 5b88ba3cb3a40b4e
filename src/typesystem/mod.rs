//! Abstract type system over loaded .NET assemblies.
//!
//! This module is the bridge between a code generator and a metadata backend. The generator
//! asks for assemblies and types by name, resolves type references it encounters, and adds
//! new members to the assembly it is producing. The [`TypeSystem`] answers those requests with
//! cached abstract [`ClrType`] values and keeps the following guarantees:
//!
//! - resolving the same reference node twice returns the same [`ClrTypeRc`]
//! - a reference whose definition cannot be found never fails resolution, it becomes a
//!   placeholder shared by all references with the same [`reference_key`]
//! - assembly references bind by exact identity first and fall back to the simple name
//! - generated members are tagged with a compiler-generated attribute exactly once
//!
//! # Key Components
//!
//! - [`TypeSystem`] - The facade owning registry, caches and marker
//! - [`TypeSystemLoader`] - Builder loading input and target assemblies
//! - [`AssemblyRegistry`] - Ordered assemblies and reference resolution tiers
//! - [`TypeCache`] - Identity and key based deduplication of abstract types
//! - [`TypeBuilder`] - Adds generated members to a type definition
//! - [`CompilerGeneratedMarker`] - The attribute generated members are tagged with
//!
//! # Thread Safety
//!
//! The caches rely on `RefCell`, so a [`TypeSystem`] is neither `Send` nor `Sync` and must stay
//! on the thread that built it.

mod assembly;
mod builder;
mod cache;
mod key;
mod loader;
mod marker;
mod registry;
mod resolver;
mod system;
mod types;

pub use assembly::{Assembly, AssemblyRc};
pub use builder::TypeBuilder;
pub use cache::TypeCache;
pub use key::reference_key;
pub use loader::TypeSystemLoader;
pub use marker::{CompilerGeneratedMarker, COMPILER_GENERATED_ATTRIBUTE};
pub use registry::AssemblyRegistry;
pub use system::TypeSystem;
pub use types::{ClrMethod, ClrType, ClrTypeRc};
