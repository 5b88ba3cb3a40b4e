//! Assembly names for cross-assembly resolution.
//!
//! This module provides [`AssemblyIdentity`], the structured form of a .NET assembly name, and
//! [`AssemblyVersion`], its four-part version number. Identities are what assembly references
//! carry and what the type system resolves against its registered assemblies.
//!
//! # ECMA-335 References
//!
//! - **Section II.6.2.1**: Assembly versioning - four-part version number semantics
//! - **Section II.6.2.1.3**: Public key and token - strong name identity format
//! - **Section II.22.5**: AssemblyRef table - assembly reference structure
//!
//! # Identity Components
//!
//! An assembly is identified by the combination of:
//! - **Simple Name**: The primary assembly name (e.g., "mscorlib", "System.Core")
//! - **Version**: Four-part version number for binding and compatibility
//! - **Culture**: Localization culture (None for culture-neutral assemblies)
//! - **Strong Name**: Public key or public key token
//!
//! # Examples
//!
//! ```rust
//! use dotbridge::metadata::identity::{AssemblyIdentity, AssemblyVersion};
//!
//! let mscorlib = AssemblyIdentity::parse(
//!     "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089"
//! )?;
//! assert_eq!(mscorlib.version, AssemblyVersion::new(4, 0, 0, 0));
//! assert_eq!(
//!     mscorlib.display_name(),
//!     "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089"
//! );
//! # Ok::<(), dotbridge::Error>(())
//! ```

use std::{fmt, fmt::Write as _, str::FromStr};

use crate::{
    metadata::identity::cryptographic::{HashAlgorithm, Identity},
    Error, Result,
};

/// Complete name of a .NET assembly or assembly reference.
///
/// # Equality Semantics
///
/// Two identities are equal if their `name`, `version`, `culture` and public key token are
/// equal. A strong name stored as a full public key is reduced to its token before comparing,
/// so a reference carrying a token matches a definition carrying the full key.
///
/// The display name ([`AssemblyIdentity::display_name`]) is the canonical string form and is
/// used as the key of the type system's assembly resolution cache.
#[derive(Debug, Clone)]
pub struct AssemblyIdentity {
    /// Simple assembly name (e.g., "mscorlib", "System.Core").
    pub name: String,

    /// Four-part version number for compatibility and binding.
    pub version: AssemblyVersion,

    /// Culture information for localized assemblies.
    ///
    /// `None` indicates a culture-neutral assembly.
    pub culture: Option<String>,

    /// Cryptographic strong name identity, either the public key or its token.
    pub strong_name: Option<Identity>,
}

impl PartialEq for AssemblyIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.version == other.version
            && self.culture == other.culture
            && self.public_key_token() == other.public_key_token()
    }
}

impl Eq for AssemblyIdentity {}

impl std::hash::Hash for AssemblyIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.culture.hash(state);
        self.public_key_token().hash(state);
    }
}

/// Four-part version numbering for .NET assemblies.
///
/// Versions are compared component-wise in order: major, minor, build, revision.
///
/// ```rust
/// use dotbridge::metadata::identity::AssemblyVersion;
///
/// let version = AssemblyVersion::new(1, 2, 3, 4);
/// assert_eq!(version.to_string(), "1.2.3.4");
///
/// let parsed = AssemblyVersion::parse("2.0")?;
/// assert!(parsed > version);
/// # Ok::<(), dotbridge::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssemblyVersion {
    /// Major version component.
    pub major: u16,
    /// Minor version component.
    pub minor: u16,
    /// Build version component.
    pub build: u16,
    /// Revision version component.
    pub revision: u16,
}

impl AssemblyIdentity {
    /// Create a new assembly identity with the specified components.
    ///
    /// # Arguments
    ///
    /// * `name` - Simple assembly name for identification
    /// * `version` - Four-part version number
    /// * `culture` - Optional culture for localized assemblies
    /// * `strong_name` - Optional cryptographic identity
    pub fn new(
        name: impl Into<String>,
        version: AssemblyVersion,
        culture: Option<String>,
        strong_name: Option<Identity>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            culture,
            strong_name,
        }
    }

    /// Create a culture-neutral identity without a strong name.
    pub fn simple(name: impl Into<String>, version: AssemblyVersion) -> Self {
        Self::new(name, version, None, None)
    }

    /// Parse an identity from its display name.
    ///
    /// # Format
    ///
    /// ```text
    /// AssemblyName[, Version=Major.Minor.Build.Revision][, Culture=culture][, PublicKeyToken=token]
    /// ```
    ///
    /// Unknown components are ignored; `Culture=neutral` and `PublicKeyToken=null` map to
    /// `None`.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the name is empty, the version is not a valid
    /// four-part version, or the public key token is not 16 hex characters.
    pub fn parse(display_name: &str) -> Result<Self> {
        let mut version = AssemblyVersion::UNKNOWN;
        let mut culture = None;
        let mut strong_name = None;

        let mut parts = display_name.split(',').map(str::trim);

        let name = parts.next().unwrap_or_default().to_string();
        if name.is_empty() {
            return Err(malformed_error!("Assembly name cannot be empty"));
        }

        for part in parts {
            if let Some(value) = part.strip_prefix("Version=") {
                version = AssemblyVersion::parse(value)?;
            } else if let Some(value) = part.strip_prefix("Culture=") {
                if value != "neutral" && !value.is_empty() {
                    culture = Some(value.to_string());
                }
            } else if let Some(value) = part.strip_prefix("PublicKeyToken=") {
                if value != "null" && !value.is_empty() {
                    let token_bytes = hex::decode(value).map_err(|e| {
                        malformed_error!("Invalid hex in PublicKeyToken '{}': {}", value, e)
                    })?;
                    strong_name = Some(Identity::from(&token_bytes, false)?);
                }
            }
        }

        Ok(Self {
            name,
            version,
            culture,
            strong_name,
        })
    }

    /// Generate the display name string for this assembly identity.
    ///
    /// The output always carries all four components, e.g.
    /// `MyLibrary, Version=1.2.3.4, Culture=en-US, PublicKeyToken=null`.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut result = String::with_capacity(self.name.len() + 80);

        result.push_str(&self.name);
        let _ = write!(result, ", Version={}", self.version);
        let _ = write!(
            result,
            ", Culture={}",
            self.culture.as_deref().unwrap_or("neutral")
        );

        result.push_str(", PublicKeyToken=");
        match self.public_key_token() {
            Some(token) => result.push_str(&hex::encode(token.to_le_bytes())),
            None => result.push_str("null"),
        }

        result
    }

    /// The public key token, computing it with SHA1 when only the full key is known.
    #[must_use]
    pub fn public_key_token(&self) -> Option<u64> {
        self.strong_name
            .as_ref()
            .map(|identity| identity.to_token(HashAlgorithm::Sha1))
    }

    /// Check if this assembly is strong-named.
    #[must_use]
    pub fn is_strong_named(&self) -> bool {
        self.strong_name.is_some()
    }

    /// Check if this assembly is culture-neutral.
    #[must_use]
    pub fn is_culture_neutral(&self) -> bool {
        self.culture.is_none()
    }
}

impl AssemblyVersion {
    /// Sentinel value (0.0.0.0) representing an unknown or unspecified version.
    pub const UNKNOWN: Self = Self {
        major: 0,
        minor: 0,
        build: 0,
        revision: 0,
    };

    /// Create a new version from its four components.
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Returns `true` for the 0.0.0.0 sentinel.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.major == 0 && self.minor == 0 && self.build == 0 && self.revision == 0
    }

    /// Check if this version can stand in for `required`.
    ///
    /// An unknown requirement accepts any version. Otherwise the major versions must match
    /// and this version must not be older than the requirement.
    #[must_use]
    pub fn is_compatible_with(&self, required: &AssemblyVersion) -> bool {
        if required.is_unknown() {
            return true;
        }

        self.major == required.major && *self >= *required
    }

    /// Parse a version string with one to four dot-separated components.
    ///
    /// Missing trailing components are zero.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for empty strings, more than four components or
    /// components that are not valid 16-bit numbers.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.split('.').collect();

        if parts.len() > 4 {
            return Err(malformed_error!("Invalid version format: {}", version_str));
        }

        let mut components = [0u16; 4];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .parse::<u16>()
                .map_err(|_| malformed_error!("Invalid version component: '{}'", part))?;
        }

        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl FromStr for AssemblyVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl FromStr for AssemblyIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
