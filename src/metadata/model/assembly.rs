//! Assembly and module nodes.

use std::sync::{Arc, OnceLock, Weak};

use strum::{Display, EnumString};

use crate::{
    metadata::{
        identity::AssemblyIdentity,
        model::{
            attributes::CustomAttributeList,
            members::{MethodRef, MethodRefRc, MethodReference},
            types::{TypeDefRc, TypeRef, TypeRefScope, TypeReference},
            ArrayType, GenericInstance,
        },
    },
    Result,
};

/// Reference to an `AssemblyDef`
pub type AssemblyDefRc = Arc<AssemblyDef>;
/// Reference to a `ModuleDef`
pub type ModuleDefRc = Arc<ModuleDef>;

/// The kind of image a module is emitted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
pub enum ModuleKind {
    /// Class library
    #[default]
    Dll,
    /// Console application
    Console,
    /// Windows (GUI) application
    Windows,
    /// Module without an assembly manifest
    NetModule,
}

/// A loaded or newly created assembly.
///
/// The first module is the main module, which carries the manifest and receives imported
/// references.
pub struct AssemblyDef {
    /// Name of this assembly
    pub identity: AssemblyIdentity,
    /// All modules of this assembly, main module first
    modules: boxcar::Vec<ModuleDefRc>,
    /// Assembly level custom attributes
    pub custom_attributes: CustomAttributeList,
}

impl AssemblyDef {
    /// Create an assembly without any module
    #[must_use]
    pub fn new(identity: AssemblyIdentity) -> AssemblyDefRc {
        Arc::new(AssemblyDef {
            identity,
            modules: boxcar::Vec::new(),
            custom_attributes: boxcar::Vec::new(),
        })
    }

    /// Create an empty assembly with a single main module
    ///
    /// ## Arguments
    /// * 'identity'    - The name of the new assembly
    /// * 'module_name' - The name of the main module
    /// * 'kind'        - The kind of image the main module is
    #[must_use]
    pub fn create(identity: AssemblyIdentity, module_name: &str, kind: ModuleKind) -> AssemblyDefRc {
        let assembly = Self::new(identity);
        let module = ModuleDef::new(module_name, kind);
        // a fresh module has no owner yet
        let _ = assembly.add_module(&module);
        assembly
    }

    /// The simple name of this assembly
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Attach a module to this assembly
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the module already belongs to an assembly.
    pub fn add_module(self: &Arc<Self>, module: &ModuleDefRc) -> Result<()> {
        module.assembly.set(Arc::downgrade(self)).map_err(|_| {
            malformed_error!("Module '{}' already belongs to an assembly", module.name)
        })?;
        self.modules.push(module.clone());
        Ok(())
    }

    /// The module carrying the manifest
    #[must_use]
    pub fn main_module(&self) -> Option<ModuleDefRc> {
        self.modules.get(0).cloned()
    }

    /// All modules, main module first
    pub fn modules(&self) -> impl Iterator<Item = &ModuleDefRc> {
        self.modules.iter().map(|(_, module)| module)
    }

    /// Find a type defined in any module of this assembly
    ///
    /// Nested types are addressed as `Namespace.Outer/Inner`.
    #[must_use]
    pub fn find_type(&self, full_name: &str) -> Option<TypeDefRc> {
        self.modules().find_map(|module| module.find_type(full_name))
    }
}

impl std::fmt::Debug for AssemblyDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssemblyDef")
            .field("identity", &self.identity.display_name())
            .field("modules", &self.modules.count())
            .finish()
    }
}

/// A module, the container of type definitions.
pub struct ModuleDef {
    /// Module name, usually the file name
    pub name: String,
    /// Image kind
    pub kind: ModuleKind,
    /// Owning assembly
    assembly: OnceLock<Weak<AssemblyDef>>,
    /// Top level types; nested types hang off their declaring type
    types: boxcar::Vec<TypeDefRc>,
    /// Assemblies referenced from this module
    assembly_references: boxcar::Vec<AssemblyIdentity>,
    /// Member references created by importing methods into this module
    member_references: boxcar::Vec<MethodRefRc>,
}

impl ModuleDef {
    /// Create a detached module
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ModuleKind) -> ModuleDefRc {
        Arc::new(ModuleDef {
            name: name.into(),
            kind,
            assembly: OnceLock::new(),
            types: boxcar::Vec::new(),
            assembly_references: boxcar::Vec::new(),
            member_references: boxcar::Vec::new(),
        })
    }

    /// The assembly this module belongs to
    #[must_use]
    pub fn assembly(&self) -> Option<AssemblyDefRc> {
        self.assembly.get().and_then(Weak::upgrade)
    }

    /// Attach a top level type to this module
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the type is already attached elsewhere.
    pub fn add_type(self: &Arc<Self>, type_def: &TypeDefRc) -> Result<()> {
        type_def.attach_to_module(self)?;
        self.types.push(type_def.clone());
        Ok(())
    }

    /// Top level types of this module
    pub fn types(&self) -> impl Iterator<Item = &TypeDefRc> {
        self.types.iter().map(|(_, type_def)| type_def)
    }

    /// Find a type by full name, nested types are addressed as `Namespace.Outer/Inner`
    #[must_use]
    pub fn find_type(&self, full_name: &str) -> Option<TypeDefRc> {
        let mut segments = full_name.split('/');
        let outer = segments.next()?;

        let mut current = self
            .types()
            .find(|type_def| type_def.full_name() == outer)
            .cloned()?;
        for nested in segments {
            current = current.find_nested(nested)?;
        }
        Some(current)
    }

    /// Assemblies referenced from this module
    pub fn assembly_references(&self) -> impl Iterator<Item = &AssemblyIdentity> {
        self.assembly_references.iter().map(|(_, identity)| identity)
    }

    /// Record a reference to `identity`, once
    pub fn add_assembly_reference(&self, identity: &AssemblyIdentity) {
        if !self.assembly_references().any(|known| known == identity) {
            self.assembly_references.push(identity.clone());
        }
    }

    /// Member references owned by this module, in import order
    pub fn member_references(&self) -> impl Iterator<Item = &MethodRefRc> {
        self.member_references.iter().map(|(_, method)| method)
    }

    /// Import a type so it can be used from this module
    ///
    /// Types already living in this module are returned as they are. Definitions from other
    /// modules become type references scoped to their defining assembly, which is added to
    /// this module's assembly references. Constructed types are imported element-wise.
    #[must_use]
    pub fn import_type(self: &Arc<Self>, reference: &TypeReference) -> TypeReference {
        if reference
            .module()
            .is_some_and(|module| Arc::ptr_eq(&module, self))
        {
            return reference.clone();
        }

        match reference {
            TypeReference::Definition(type_def) => {
                let Some(type_def) = type_def.upgrade() else {
                    return reference.clone();
                };
                let scope = match type_def.declaring_type() {
                    Some(outer) => match self.import_type(&TypeReference::from(outer)) {
                        TypeReference::Reference(outer_ref) => TypeRefScope::Nested(outer_ref),
                        _ => return reference.clone(),
                    },
                    None => match type_def.module().and_then(|module| module.assembly()) {
                        Some(assembly) => {
                            self.add_assembly_reference(&assembly.identity);
                            TypeRefScope::Assembly(assembly.identity.clone())
                        }
                        None => return reference.clone(),
                    },
                };
                let imported = TypeRef::new(&type_def.namespace, &type_def.name, scope);
                let _ = imported.set_module(self);
                TypeReference::Reference(imported)
            }
            TypeReference::Reference(type_ref) => {
                let scope = match &type_ref.scope {
                    TypeRefScope::Assembly(identity) => {
                        self.add_assembly_reference(identity);
                        TypeRefScope::Assembly(identity.clone())
                    }
                    TypeRefScope::Nested(outer) => {
                        match self.import_type(&TypeReference::Reference(outer.clone())) {
                            TypeReference::Reference(outer_ref) => TypeRefScope::Nested(outer_ref),
                            _ => return reference.clone(),
                        }
                    }
                    TypeRefScope::Module(module) => TypeRefScope::Module(module.clone()),
                };
                let imported = TypeRef::new(&type_ref.namespace, &type_ref.name, scope);
                let _ = imported.set_module(self);
                TypeReference::Reference(imported)
            }
            TypeReference::GenericInstance(instance) => GenericInstance::new(
                self.import_type(&instance.element),
                instance
                    .arguments
                    .iter()
                    .map(|argument| self.import_type(argument))
                    .collect(),
            ),
            TypeReference::Array(array) => {
                ArrayType::new(self.import_type(&array.element), array.rank)
            }
            TypeReference::GenericParameter(_) => reference.clone(),
        }
    }

    /// Import a method so it can be referenced from this module
    ///
    /// Methods declared in this module are returned as they are, anything else becomes a
    /// member reference whose declaring type and signature are imported. The new reference
    /// is owned by this module.
    #[must_use]
    pub fn import_method(self: &Arc<Self>, method: &MethodReference) -> MethodReference {
        if method
            .module()
            .is_some_and(|module| Arc::ptr_eq(&module, self))
        {
            return method.clone();
        }

        let Some(declaring_type) = method.declaring_type() else {
            return method.clone();
        };

        let imported = MethodRef::new(
            method.name(),
            self.import_type(&declaring_type),
            method
                .return_type()
                .map(|return_type| self.import_type(&return_type)),
            method
                .parameter_types()
                .iter()
                .map(|parameter| self.import_type(parameter))
                .collect(),
        );
        let _ = imported.set_module(self);
        self.member_references.push(imported.clone());
        MethodReference::Reference(imported)
    }
}

impl std::fmt::Debug for ModuleDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("types", &self.types.count())
            .field("member_references", &self.member_references.count())
            .finish()
    }
}
