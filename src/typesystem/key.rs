//! Structural keys for type references.
//!
//! Distinct reference nodes can denote the same type. For ordinary types the full name is
//! enough to tell them apart, but generic parameters are only ever named `T`, `TKey`, ... and
//! need their owner folded in:
//!
//! ```text
//! type owner:   OwnerTypeFullName|GenericParameter|T
//! method owner: key(OwnerDeclaringType) + OwnerMethodFullName|GenericParameter|T
//! ```

use crate::{
    metadata::model::{GenericOwner, TypeReference},
    Result,
};

const GENERIC_PARAMETER: &str = "|GenericParameter|";

/// Derive the structural key of `reference`
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for a generic parameter that is neither owned by a type
/// nor by a method attached to a type.
pub fn reference_key(reference: &TypeReference) -> Result<String> {
    let TypeReference::GenericParameter(param) = reference else {
        return Ok(reference.full_name());
    };

    match param.owner() {
        Some(GenericOwner::Type(owner)) => Ok(format!(
            "{}{}{}",
            owner.full_name(),
            GENERIC_PARAMETER,
            reference.full_name()
        )),
        Some(GenericOwner::Method(owner)) => {
            let declaring_type = owner.declaring_type().ok_or_else(|| {
                malformed_error!(
                    "Unable to get key for '{}', method '{}' has no declaring type",
                    param.name,
                    owner.name()
                )
            })?;
            Ok(format!(
                "{}{}{}{}",
                reference_key(&declaring_type)?,
                owner.full_name(),
                GENERIC_PARAMETER,
                reference.full_name()
            ))
        }
        None => Err(malformed_error!(
            "Unable to get key for '{}', owner is neither a type nor a method",
            param.name
        )),
    }
}
