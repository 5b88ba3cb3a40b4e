use std::path::PathBuf;

use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Only a handful of conditions are fatal to the bridge. A type reference that cannot be
/// resolved is deliberately **not** an error; it degrades to an unresolved placeholder type
/// so code generation can continue against a partial set of assemblies.
///
/// # Error Categories
///
/// ## Resolution Errors
/// - [`Error::AssemblyNotFound`] - A required assembly reference matched no registered assembly
/// - [`Error::MarkerNotFound`] - The compiler-generated marker could not be located at construction
///
/// ## Caller Errors
/// - [`Error::UnsupportedMember`] - The member cannot carry custom attributes
/// - [`Error::DetachedMember`] - The member has not been attached to a module yet
///
/// ## Input Errors
/// - [`Error::Malformed`] - Malformed metadata or identity strings
/// - [`Error::LocationNotFound`] - The metadata provider has nothing at a location
/// - [`Error::Error`] - Miscellaneous provider failures
///
/// # Examples
///
/// ```rust
/// use dotbridge::{Error, metadata::identity::AssemblyIdentity};
///
/// match AssemblyIdentity::parse("MyLib, Version=1.x") {
///     Ok(identity) => println!("Parsed {}", identity),
///     Err(Error::Malformed { message, .. }) => eprintln!("Malformed: {}", message),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input is damaged and could not be interpreted.
    ///
    /// Raised for malformed assembly display names and versions, and for generic
    /// parameters whose owner is neither a type nor a method.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A required assembly reference could not be resolved.
    ///
    /// None of the resolution tiers (cached display name, exact identity, simple name)
    /// produced a registered assembly. The associated value is the display name of the
    /// reference.
    #[error("Failed to resolve assembly - {0}")]
    AssemblyNotFound(String),

    /// The compiler-generated marker type or its constructor could not be found.
    ///
    /// This aborts construction of the type system; no partially initialized
    /// instance is ever returned.
    #[error("Compiler-generated marker is unavailable - {0}")]
    MarkerNotFound(String),

    /// The member does not support custom attributes.
    ///
    /// Type and method *references* cannot carry attributes; only definitions can.
    #[error("Member '{0}' does not support custom attributes")]
    UnsupportedMember(String),

    /// The member has not yet been added to a module.
    #[error("Member '{0}' has not yet been added to a module")]
    DetachedMember(String),

    /// The metadata provider has no assembly at the requested location.
    #[error("No assembly available at location {}", .0.display())]
    LocationNotFound(PathBuf),

    /// Generic error for miscellaneous failures.
    ///
    /// Used by metadata providers for failures that don't fit into other categories.
    #[error("{0}")]
    Error(String),
}
