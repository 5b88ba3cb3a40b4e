//! Strong-name identity for .NET assemblies.
//!
//! This module provides the [`Identity`] enum for representing the cryptographic part of an
//! assembly name: either the full public key or the 8-byte public key token derived from it.
//! Tokens are computed by hashing the public key with MD5 or SHA1 as specified by ECMA-335
//! §II.6.2.1.3 and keeping the last 8 bytes of the digest.
//!
//! # Example
//! ```rust
//! use dotbridge::metadata::identity::{HashAlgorithm, Identity};
//!
//! let pubkey = vec![1, 2, 3, 4, 5, 6, 7, 8];
//! let id = Identity::from(&pubkey, true).unwrap();
//! let token = id.to_token(HashAlgorithm::Sha1);
//! assert_eq!(Identity::Token(token).to_token(HashAlgorithm::Md5), token);
//! ```

use md5::{Digest, Md5};
use sha1::Sha1;
use strum::{Display, EnumString};

use crate::Result;

/// Hash algorithm used to turn a public key into its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
pub enum HashAlgorithm {
    /// MD5, only used by very old toolchains
    #[strum(serialize = "MD5")]
    Md5,
    /// SHA1, the algorithm used by every mainstream .NET compiler
    #[default]
    #[strum(serialize = "SHA1")]
    Sha1,
}

/// An identifier for an assembly's strong name.
/// Can be either a public-key or a hashed Token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// The full RSA public-key
    PubKey(Vec<u8>),
    /// 8-byte end of the hash of the public-key
    Token(u64),
}

impl Identity {
    /// Create an `Identity` from raw data.
    ///
    /// # Arguments
    /// * `data`    - The data to create the identity from
    /// * `is_pub`  - Is it a token, or a public-key
    ///
    /// # Errors
    /// Returns an error if a token is requested and `data` is not exactly 8 bytes long.
    pub fn from(data: &[u8], is_pub: bool) -> Result<Self> {
        if is_pub {
            return Ok(Identity::PubKey(data.to_vec()));
        }

        let bytes: [u8; 8] = data.try_into().map_err(|_| {
            malformed_error!(
                "Public key token must be exactly 8 bytes, got {} bytes",
                data.len()
            )
        })?;
        Ok(Identity::Token(u64::from_le_bytes(bytes)))
    }

    /// Get the token based on the provided `algo`; The token is the last 8 bytes of the hash
    /// of the public-key. A [`Identity::Token`] is returned unchanged.
    ///
    /// # Arguments
    /// * `algo` - The hash algorithm that the target assembly uses
    #[must_use]
    pub fn to_token(&self, algo: HashAlgorithm) -> u64 {
        match self {
            Identity::PubKey(data) => {
                let digest = match algo {
                    HashAlgorithm::Md5 => Md5::digest(data).to_vec(),
                    HashAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
                };

                let mut tail = [0u8; 8];
                tail.copy_from_slice(&digest[digest.len() - 8..]);
                u64::from_le_bytes(tail)
            }
            Identity::Token(token) => *token,
        }
    }
}
