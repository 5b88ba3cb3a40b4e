//! Deduplication of abstract types.
//!
//! Three maps back the cache:
//!
//! - **References** - every reference node ever passed through resolution, keyed by node
//!   identity. Repeated queries for the same node are answered from here without touching the
//!   metadata provider again.
//! - **Resolved** - one [`ClrType`] per resolved reference node.
//! - **Unresolved** - one placeholder per structural key, so that distinct reference nodes that
//!   denote the same missing type share a single placeholder.
//!
//! Each identity-keyed entry keeps a clone of its node, which keeps the node alive and its
//! [`NodeId`] from being reused for as long as the cache exists.
//!
//! Entries are never replaced once inserted.

use std::{
    cell::RefCell,
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use crate::{
    metadata::model::{NodeId, TypeDefRc, TypeReference},
    typesystem::{ClrType, ClrTypeRc},
};

type IdentityMap = RefCell<HashMap<NodeId, (TypeReference, ClrTypeRc)>>;

/// Cache of every abstract type the type system has handed out.
#[derive(Default)]
pub struct TypeCache {
    references: IdentityMap,
    resolved: IdentityMap,
    unresolved: RefCell<HashMap<String, ClrTypeRc>>,
}

impl TypeCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The type previously recorded for this exact reference node
    #[must_use]
    pub fn lookup(&self, reference: &TypeReference) -> Option<ClrTypeRc> {
        self.references
            .borrow()
            .get(&reference.id())
            .map(|(_, ty)| ty.clone())
    }

    /// Record `ty` as the answer for `reference`, returning the entry that ends up in the cache
    pub fn record(&self, reference: &TypeReference, ty: ClrTypeRc) -> ClrTypeRc {
        match self.references.borrow_mut().entry(reference.id()) {
            Entry::Occupied(entry) => entry.get().1.clone(),
            Entry::Vacant(entry) => entry.insert((reference.clone(), ty)).1.clone(),
        }
    }

    /// Get or create the resolved type for `reference`
    pub fn resolved(&self, reference: &TypeReference, definition: &TypeDefRc) -> ClrTypeRc {
        self.resolved
            .borrow_mut()
            .entry(reference.id())
            .or_insert_with(|| {
                (
                    reference.clone(),
                    Arc::new(ClrType::Resolved {
                        reference: reference.clone(),
                        definition: definition.clone(),
                    }),
                )
            })
            .1
            .clone()
    }

    /// Get or create the placeholder for `key`
    ///
    /// `reference` is only stored when the placeholder is created.
    pub fn unresolved(&self, reference: &TypeReference, key: String) -> ClrTypeRc {
        match self.unresolved.borrow_mut().entry(key) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let placeholder = Arc::new(ClrType::Unresolved {
                    reference: reference.clone(),
                    key: entry.key().clone(),
                });
                entry.insert(placeholder).clone()
            }
        }
    }

    /// Number of reference nodes answered so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.references.borrow().len()
    }

    /// Returns `true` if nothing was resolved yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.borrow().is_empty()
    }

    /// Number of distinct resolved types
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.resolved.borrow().len()
    }

    /// Number of distinct placeholders
    #[must_use]
    pub fn unresolved_count(&self) -> usize {
        self.unresolved.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        identity::{AssemblyIdentity, AssemblyVersion},
        model::{TypeAttributes, TypeDef, TypeRef, TypeRefScope},
    };

    fn missing_ref() -> TypeReference {
        TypeReference::Reference(TypeRef::new(
            "Gone",
            "Missing",
            TypeRefScope::Assembly(AssemblyIdentity::simple("Gone", AssemblyVersion::UNKNOWN)),
        ))
    }

    #[test]
    fn test_resolved_is_per_node() {
        let cache = TypeCache::new();
        let definition = TypeDef::new("App", "Widget", TypeAttributes::PUBLIC);
        let reference = TypeReference::from(&definition);

        let first = cache.resolved(&reference, &definition);
        let second = cache.resolved(&reference.clone(), &definition);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.resolved_count(), 1);
    }

    #[test]
    fn test_unresolved_is_per_key() {
        let cache = TypeCache::new();
        let first_ref = missing_ref();
        let second_ref = missing_ref();
        assert_ne!(first_ref.id(), second_ref.id());

        let first = cache.unresolved(&first_ref, second_ref.full_name());
        let second = cache.unresolved(&second_ref, second_ref.full_name());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.unresolved_count(), 1);
        assert_eq!(first.reference().id(), first_ref.id());
    }

    #[test]
    fn test_record_keeps_first_entry() {
        let cache = TypeCache::new();
        let reference = missing_ref();
        assert!(cache.lookup(&reference).is_none());

        let first = cache.unresolved(&reference, "a".to_string());
        let other = cache.unresolved(&reference, "b".to_string());

        let stored = cache.record(&reference, first.clone());
        assert!(Arc::ptr_eq(&stored, &first));
        let stored = cache.record(&reference, other);
        assert!(Arc::ptr_eq(&stored, &first));
        assert!(Arc::ptr_eq(&cache.lookup(&reference).unwrap(), &first));
        assert_eq!(cache.len(), 1);
    }
}
