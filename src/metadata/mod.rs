//! Raw .NET metadata as seen by the type system.
//!
//! This module contains everything below the type-system bridge: the naming layer for
//! assemblies, the in-memory object model of a metadata graph, and the provider seam through
//! which a concrete backend supplies such graphs.
//!
//! # Key Components
//!
//! - [`identity`] - Assembly names, versions and strong-name identities
//! - [`model`] - Assemblies, modules, types, generic parameters, methods, fields, attributes
//! - [`provider`] - The [`provider::MetadataProvider`] and [`provider::AssemblyResolver`] traits
//!
//! # Examples
//!
//! ```rust
//! use dotbridge::metadata::{
//!     identity::{AssemblyIdentity, AssemblyVersion},
//!     model::{AssemblyDef, ModuleKind, TypeAttributes, TypeDef},
//! };
//!
//! let assembly = AssemblyDef::create(
//!     AssemblyIdentity::simple("Shapes", AssemblyVersion::new(1, 0, 0, 0)),
//!     "Shapes.dll",
//!     ModuleKind::Dll,
//! );
//! let circle = TypeDef::new("Shapes", "Circle", TypeAttributes::PUBLIC);
//! assembly.main_module().unwrap().add_type(&circle)?;
//! # Ok::<(), dotbridge::Error>(())
//! ```

/// Implementation of assembly names and strong-name identities
pub mod identity;
/// Implementation of the raw metadata object model
pub mod model;
/// Implementation of the metadata backend seam
pub mod provider;
