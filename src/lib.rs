// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0


#![doc(html_no_source)]
#![deny(missing_docs)]

//! # dotbridge
//!
//! A type-system bridge between a code generator and .NET assembly metadata. The generator
//! works with abstract, cached [`typesystem::ClrType`] values; `dotbridge` maps them onto the
//! raw metadata graph of the loaded assemblies and onto the assembly being produced.
//!
//! ## Features
//!
//! - **Stable identities** - resolving the same reference twice yields the same type object
//! - **Graceful degradation** - references into missing assemblies become placeholder types
//! - **Tolerant binding** - assembly references fall back to simple-name matching
//! - **Generated member tagging** - `CompilerGeneratedAttribute` is applied exactly once
//! - **Pluggable backends** - metadata is obtained through [`metadata::provider::MetadataProvider`]
//!
//! ## Quick Start
//!
//! ```rust
//! use dotbridge::prelude::*;
//!
//! let corlib = AssemblyDef::create(
//!     AssemblyIdentity::simple("mscorlib", AssemblyVersion::new(4, 0, 0, 0)),
//!     "mscorlib",
//!     ModuleKind::Dll,
//! );
//! let module = corlib.main_module().unwrap();
//! let marker = TypeDef::new("System.Runtime.CompilerServices", "CompilerGeneratedAttribute", TypeAttributes::PUBLIC);
//! module.add_type(&marker)?;
//! marker.add_method(&MethodDef::constructor(MethodAttributes::PUBLIC, Vec::new()))?;
//!
//! let app = AssemblyDef::create(
//!     AssemblyIdentity::simple("App", AssemblyVersion::new(1, 0, 0, 0)),
//!     "App",
//!     ModuleKind::Console,
//! );
//!
//! let provider = MemoryProvider::new()
//!     .with_assembly("ref/mscorlib.dll", corlib)
//!     .with_assembly("bin/App.dll", app);
//! let system = TypeSystem::new(provider, ["ref/mscorlib.dll"], Some("bin/App.dll"))?;
//!
//! // add a generated type to the target
//! let target = system.target_definition().unwrap().main_module().unwrap();
//! let helpers = TypeDef::new("App", "Helpers", TypeAttributes::PUBLIC);
//! target.add_type(&helpers)?;
//! let builder = system.create_type_builder(&helpers, true)?;
//! let helpers = builder.create_type();
//!
//! assert!(std::sync::Arc::ptr_eq(&helpers, &system.find_type("App.Helpers").unwrap()));
//! # Ok::<(), dotbridge::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - identities, the raw metadata graph and the provider seam
//! - [`typesystem`] - the facade, its caches, assembly resolution and member tagging
//!
//! ## Logging
//!
//! Resolution decisions are reported through the [`log`] facade: assembly registrations and
//! placeholder creation at `debug`, cache misses at `trace`, and assembly references bound to
//! an incompatible version at `warn`. Install any `log` backend to see them.
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result`]. A type that cannot be resolved is not an error;
//! see [`Error`] for the conditions that are.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dotbridge::prelude::*;
///
/// let identity = AssemblyIdentity::parse("mscorlib, Version=4.0.0.0")?;
/// assert_eq!(identity.version, AssemblyVersion::new(4, 0, 0, 0));
/// # Ok::<(), dotbridge::Error>(())
/// ```
pub mod prelude;

/// Assembly identities, the raw metadata graph and the metadata provider seam
pub mod metadata;

/// The abstract type system handed to code generators
pub mod typesystem;

/// `dotbridge` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dotbridge` Error type
///
/// Only a handful of conditions are errors; unresolved types degrade instead.
pub use error::Error;

/// The type system facade, see [`typesystem::TypeSystem`]
pub use typesystem::{TypeSystem, TypeSystemLoader};
