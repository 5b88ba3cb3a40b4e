//! Assembly identity for .NET assemblies.
//!
//! This module provides the naming layer the type system resolves assembly references
//! against: structured assembly names, four-part versions, and strong-name identities.
//!
//! # ECMA-335 References
//!
//! - **Section II.6.3**: Referencing assemblies - defines assembly reference format
//! - **Section II.6.2.1.3**: PublicKeyToken - defines public key token computation
//!
//! # Module Structure
//!
//! - [`AssemblyIdentity`] - Assembly name with version, culture, and strong name
//! - [`AssemblyVersion`] - Four-part version numbering with parsing and comparison
//! - [`Identity`] - Public key and token-based cryptographic identity
//! - [`HashAlgorithm`] - Algorithm used to derive a token from a public key
//!
//! # Usage Examples
//!
//! ```rust
//! use dotbridge::metadata::identity::{AssemblyIdentity, AssemblyVersion};
//!
//! let identity = AssemblyIdentity::simple("MyLibrary", AssemblyVersion::new(1, 0, 0, 0));
//! let parsed = AssemblyIdentity::parse("MyLibrary, Version=1.0.0.0")?;
//! assert_eq!(identity, parsed);
//! # Ok::<(), dotbridge::Error>(())
//! ```

pub use assembly::{AssemblyIdentity, AssemblyVersion};
pub use cryptographic::{HashAlgorithm, Identity};

mod assembly;
mod cryptographic;
