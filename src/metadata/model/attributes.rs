//! Custom attributes attached to definitions.

use crate::metadata::model::{members::MethodReference, types::TypeReference};

/// An append-only list of custom attributes
pub type CustomAttributeList = boxcar::Vec<CustomAttribute>;

/// A custom attribute, identified by the constructor that instantiates it.
///
/// Constructor arguments are not modelled; the bridge only ever attaches argument-less
/// marker attributes.
#[derive(Debug, Clone)]
pub struct CustomAttribute {
    /// The attribute constructor, imported into the module of the attributed member
    pub constructor: MethodReference,
}

impl CustomAttribute {
    /// Create an attribute instantiated through `constructor`
    #[must_use]
    pub fn new(constructor: MethodReference) -> Self {
        CustomAttribute { constructor }
    }

    /// The attribute type, i.e. the type declaring the constructor
    #[must_use]
    pub fn attribute_type(&self) -> Option<TypeReference> {
        self.constructor.declaring_type()
    }
}
