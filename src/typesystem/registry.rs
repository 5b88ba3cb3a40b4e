//! Ordered registry of loaded assemblies and assembly-name resolution.
//!
//! Assembly references are resolved in three tiers, first match wins:
//!
//! 1. a cache of previously resolved display names
//! 2. exact identity match (name, version, culture and public key token)
//! 3. simple-name match
//!
//! The third tier is what lets a reference to `mscorlib, Version=4.0.0.0` bind to whatever
//! `mscorlib` is actually loaded. A hit that crosses major versions or goes backwards is still
//! accepted, but logged as a warning.

use std::{cell::RefCell, collections::HashMap, path::PathBuf};

use crate::{
    metadata::{
        identity::AssemblyIdentity,
        model::{AssemblyDefRc, NodeId},
        provider::{AssemblyResolver, ReaderOptions},
    },
    typesystem::{Assembly, AssemblyRc},
    Error, Result,
};

/// Registered assemblies, in registration order.
#[derive(Default)]
pub struct AssemblyRegistry {
    assemblies: RefCell<Vec<AssemblyRc>>,
    by_handle: RefCell<HashMap<NodeId, AssemblyRc>>,
    by_reference: RefCell<HashMap<String, AssemblyRc>>,
}

impl AssemblyRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `definition` and append it
    pub fn register(
        &self,
        definition: AssemblyDefRc,
        location: Option<PathBuf>,
        options: ReaderOptions,
    ) -> AssemblyRc {
        log::debug!(
            "registering assembly {} ({:?})",
            definition.identity.display_name(),
            options
        );

        let handle = NodeId::of(&definition);
        let assembly = Assembly::new(definition, location, options);
        self.assemblies.borrow_mut().push(assembly.clone());
        self.by_handle.borrow_mut().insert(handle, assembly.clone());
        assembly
    }

    /// Snapshot of all registered assemblies, in registration order
    #[must_use]
    pub fn assemblies(&self) -> Vec<AssemblyRc> {
        self.assemblies.borrow().clone()
    }

    /// Number of registered assemblies
    #[must_use]
    pub fn len(&self) -> usize {
        self.assemblies.borrow().len()
    }

    /// Returns `true` if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assemblies.borrow().is_empty()
    }

    /// First registered assembly with simple name `name`
    #[must_use]
    pub fn find(&self, name: &str) -> Option<AssemblyRc> {
        self.assemblies
            .borrow()
            .iter()
            .find(|assembly| assembly.name() == name)
            .cloned()
    }

    /// The wrapper registered for the raw assembly `definition`
    #[must_use]
    pub fn by_handle(&self, definition: &AssemblyDefRc) -> Option<AssemblyRc> {
        self.by_handle.borrow().get(&NodeId::of(definition)).cloned()
    }

    /// Resolve an assembly reference
    ///
    /// Returns `Ok(None)` on a miss unless `required` is set.
    ///
    /// # Errors
    /// Returns [`Error::AssemblyNotFound`] on a miss when `required` is set.
    pub fn resolve_reference(
        &self,
        name: &AssemblyIdentity,
        required: bool,
    ) -> Result<Option<AssemblyRc>> {
        let display_name = name.display_name();
        if let Some(cached) = self.by_reference.borrow().get(&display_name) {
            return Ok(Some(cached.clone()));
        }

        let found = self.find_exact(name).or_else(|| self.find_by_name(name));
        match found {
            Some(assembly) => {
                self.by_reference
                    .borrow_mut()
                    .insert(display_name, assembly.clone());
                Ok(Some(assembly))
            }
            None if required => Err(Error::AssemblyNotFound(display_name)),
            None => {
                log::debug!("assembly reference {} did not resolve", display_name);
                Ok(None)
            }
        }
    }

    fn find_exact(&self, name: &AssemblyIdentity) -> Option<AssemblyRc> {
        self.assemblies
            .borrow()
            .iter()
            .find(|assembly| assembly.identity() == name)
            .cloned()
    }

    fn find_by_name(&self, name: &AssemblyIdentity) -> Option<AssemblyRc> {
        let assembly = self.find(&name.name)?;

        if assembly.identity().version.is_compatible_with(&name.version) {
            log::debug!(
                "assembly reference {} bound by name to {}",
                name.display_name(),
                assembly.identity().display_name()
            );
        } else {
            log::warn!(
                "assembly reference {} bound to incompatible version {}",
                name.display_name(),
                assembly.identity().version
            );
        }

        Some(assembly)
    }
}

impl AssemblyResolver for AssemblyRegistry {
    fn resolve(&self, name: &AssemblyIdentity) -> Result<AssemblyDefRc> {
        self.resolve_reference(name, true)?
            .map(|assembly| assembly.definition().clone())
            .ok_or_else(|| Error::AssemblyNotFound(name.display_name()))
    }

    fn coerce(&self, name: &AssemblyIdentity) -> AssemblyIdentity {
        match self.resolve_reference(name, false) {
            Ok(Some(assembly)) => assembly.identity().clone(),
            _ => name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::{
        identity::{AssemblyVersion, Identity},
        model::{AssemblyDef, ModuleKind},
    };

    fn assembly(name: &str, version: AssemblyVersion) -> AssemblyDefRc {
        AssemblyDef::create(AssemblyIdentity::simple(name, version), name, ModuleKind::Dll)
    }

    fn registry() -> AssemblyRegistry {
        let registry = AssemblyRegistry::new();
        registry.register(
            assembly("mscorlib", AssemblyVersion::new(4, 0, 0, 0)),
            None,
            ReaderOptions::dependency(),
        );
        registry.register(
            assembly("App", AssemblyVersion::new(1, 2, 0, 0)),
            None,
            ReaderOptions::target(),
        );
        registry
    }

    #[test]
    fn test_register_keeps_order() {
        let registry = registry();
        let names: Vec<_> = registry
            .assemblies()
            .iter()
            .map(|assembly| assembly.name().to_string())
            .collect();
        assert_eq!(names, vec!["mscorlib", "App"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_find_first_match() {
        let registry = registry();
        let duplicate = registry.register(
            assembly("App", AssemblyVersion::new(9, 0, 0, 0)),
            None,
            ReaderOptions::dependency(),
        );

        let found = registry.find("App").unwrap();
        assert_eq!(found.identity().version, AssemblyVersion::new(1, 2, 0, 0));
        assert!(!Arc::ptr_eq(&found, &duplicate));
        assert!(registry.find("Missing").is_none());
    }

    #[test]
    fn test_by_handle() {
        let registry = registry();
        let definition = assembly("Extra", AssemblyVersion::UNKNOWN);
        assert!(registry.by_handle(&definition).is_none());

        let wrapper = registry.register(definition.clone(), None, ReaderOptions::empty());
        assert!(Arc::ptr_eq(&registry.by_handle(&definition).unwrap(), &wrapper));
    }

    #[test]
    fn test_resolve_exact_before_name() {
        let registry = registry();
        let newer = registry.register(
            assembly("mscorlib", AssemblyVersion::new(5, 0, 0, 0)),
            None,
            ReaderOptions::dependency(),
        );

        let request = AssemblyIdentity::simple("mscorlib", AssemblyVersion::new(5, 0, 0, 0));
        let found = registry.resolve_reference(&request, true).unwrap().unwrap();
        assert!(Arc::ptr_eq(&found, &newer));
    }

    #[test]
    fn test_resolve_by_name_any_version() {
        let registry = registry();
        let request = AssemblyIdentity::new(
            "mscorlib",
            AssemblyVersion::new(2, 0, 0, 0),
            None,
            Some(Identity::Token(0x89e0_34e0_5c56_1977)),
        );

        let found = registry.resolve_reference(&request, true).unwrap().unwrap();
        assert_eq!(found.identity().version, AssemblyVersion::new(4, 0, 0, 0));
        assert_eq!(registry.coerce(&request), *found.identity());
    }

    #[test]
    fn test_resolve_cached() {
        let registry = registry();
        let request = AssemblyIdentity::simple("App", AssemblyVersion::UNKNOWN);
        let first = registry.resolve_reference(&request, true).unwrap().unwrap();

        // a later registration with an exact match does not displace the cached answer
        registry.register(
            assembly("App", AssemblyVersion::UNKNOWN),
            None,
            ReaderOptions::dependency(),
        );
        let second = registry.resolve_reference(&request, true).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_resolve_miss() {
        let registry = registry();
        let request = AssemblyIdentity::simple("Nowhere", AssemblyVersion::new(1, 0, 0, 0));

        assert!(registry.resolve_reference(&request, false).unwrap().is_none());
        assert!(matches!(
            registry.resolve_reference(&request, true),
            Err(Error::AssemblyNotFound(_))
        ));
        assert!(matches!(
            AssemblyResolver::resolve(&registry, &request),
            Err(Error::AssemblyNotFound(_))
        ));
        assert_eq!(registry.coerce(&request), request);
    }
}
