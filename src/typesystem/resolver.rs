//! Type reference resolution.
//!
//! [`TypeResolver`] owns the metadata provider, the assembly registry and the type cache, and
//! implements the single algorithm every lookup of the type system funnels into:
//!
//! 1. answer from the identity cache if this exact reference node was seen before
//! 2. ask the provider for the definition, resolving assembly names through the registry
//! 3. on success, take the resolved type for the reference from the cache
//! 4. on failure, take the placeholder for the reference's structural key from the cache
//! 5. record the answer for the reference node
//!
//! A missing assembly is a resolution failure, not an error. Only malformed generic parameter
//! owners and provider failures other than [`Error::AssemblyNotFound`] propagate.

use crate::{
    metadata::{
        model::{TypeDefRc, TypeReference},
        provider::MetadataProvider,
    },
    typesystem::{reference_key, Assembly, AssemblyRegistry, ClrTypeRc, TypeCache},
    Error, Result,
};

pub(crate) struct TypeResolver {
    provider: Box<dyn MetadataProvider>,
    registry: AssemblyRegistry,
    cache: TypeCache,
}

impl TypeResolver {
    pub(crate) fn new(provider: Box<dyn MetadataProvider>) -> Self {
        TypeResolver {
            provider,
            registry: AssemblyRegistry::new(),
            cache: TypeCache::new(),
        }
    }

    pub(crate) fn provider(&self) -> &dyn MetadataProvider {
        self.provider.as_ref()
    }

    pub(crate) fn registry(&self) -> &AssemblyRegistry {
        &self.registry
    }

    pub(crate) fn cache(&self) -> &TypeCache {
        &self.cache
    }

    /// Resolve `reference` to its cached abstract type
    pub(crate) fn resolve(&self, reference: &TypeReference) -> Result<ClrTypeRc> {
        if let Some(cached) = self.cache.lookup(reference) {
            return Ok(cached);
        }

        let resolved = match self.definition_of(reference)? {
            Some(definition) => self.cache.resolved(reference, &definition),
            None => {
                let key = reference_key(reference)?;
                log::debug!("type {} is unresolved, using a placeholder", key);
                self.cache.unresolved(reference, key)
            }
        };

        Ok(self.cache.record(reference, resolved))
    }

    /// Abstract type of a definition known to exist
    pub(crate) fn resolve_definition(&self, definition: &TypeDefRc) -> ClrTypeRc {
        let reference = TypeReference::from(definition);
        if let Some(cached) = self.cache.lookup(&reference) {
            return cached;
        }

        let resolved = self.cache.resolved(&reference, definition);
        self.cache.record(&reference, resolved)
    }

    /// The definition `reference` denotes, `None` if it cannot be located
    pub(crate) fn definition_of(&self, reference: &TypeReference) -> Result<Option<TypeDefRc>> {
        match self.provider.resolve_type(reference, &self.registry) {
            Err(Error::AssemblyNotFound(name)) => {
                log::trace!(
                    "defining assembly {} of {} is not loaded",
                    name,
                    reference.full_name()
                );
                Ok(None)
            }
            other => other,
        }
    }

    /// First type called `full_name` across all registered assemblies
    pub(crate) fn find_type(&self, full_name: &str) -> Option<ClrTypeRc> {
        self.registry
            .assemblies()
            .iter()
            .find_map(|assembly| self.find_type_in(full_name, assembly))
    }

    pub(crate) fn find_type_in(&self, full_name: &str, assembly: &Assembly) -> Option<ClrTypeRc> {
        assembly
            .find_definition(full_name)
            .map(|definition| self.resolve_definition(&definition))
    }
}
