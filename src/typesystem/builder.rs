//! Adding generated members to a type definition.

use crate::{
    metadata::model::{
        FieldAttributes, FieldDef, FieldDefRc, Member, MethodAttributes, MethodDef, MethodDefRc,
        ModuleDefRc, ParameterDef, TypeAttributes, TypeDef, TypeDefRc, TypeReference,
    },
    typesystem::{AssemblyRc, ClrTypeRc, TypeSystem},
    Result,
};

/// Builder for the members of a type definition.
///
/// Every member defined through the builder is tagged as compiler-generated, unless the type
/// itself carries the tag. Types used in signatures are imported into the type's module.
pub struct TypeBuilder<'a> {
    system: &'a TypeSystem,
    definition: TypeDefRc,
    module: ModuleDefRc,
    assembly: Option<AssemblyRc>,
}

impl<'a> TypeBuilder<'a> {
    pub(crate) fn new(
        system: &'a TypeSystem,
        definition: TypeDefRc,
        module: ModuleDefRc,
        assembly: Option<AssemblyRc>,
    ) -> Self {
        TypeBuilder {
            system,
            definition,
            module,
            assembly,
        }
    }

    /// The type being built
    #[must_use]
    pub fn definition(&self) -> &TypeDefRc {
        &self.definition
    }

    /// The registered assembly containing the type
    #[must_use]
    pub fn assembly(&self) -> Option<&AssemblyRc> {
        self.assembly.as_ref()
    }

    /// Define a method
    ///
    /// # Errors
    /// Returns an error if the method cannot be tagged.
    pub fn define_method(
        &self,
        name: &str,
        flags: MethodAttributes,
        return_type: Option<TypeReference>,
        parameters: Vec<ParameterDef>,
    ) -> Result<MethodDefRc> {
        let method = MethodDef::new(
            name,
            flags,
            return_type.map(|return_type| self.module.import_type(&return_type)),
            self.import_parameters(parameters),
        );
        self.attach_method(method)
    }

    /// Define an instance constructor
    ///
    /// # Errors
    /// Returns an error if the constructor cannot be tagged.
    pub fn define_constructor(
        &self,
        flags: MethodAttributes,
        parameters: Vec<ParameterDef>,
    ) -> Result<MethodDefRc> {
        let constructor = MethodDef::constructor(flags, self.import_parameters(parameters));
        self.attach_method(constructor)
    }

    /// Define a field
    ///
    /// # Errors
    /// Returns an error if the field cannot be tagged.
    pub fn define_field(
        &self,
        name: &str,
        flags: FieldAttributes,
        field_type: &TypeReference,
    ) -> Result<FieldDefRc> {
        let field = FieldDef::new(name, flags, self.module.import_type(field_type));
        self.definition.add_field(&field)?;
        self.system
            .tag_compiler_generated(&Member::Field(field.clone()))?;
        Ok(field)
    }

    /// Define a nested type and start building it
    ///
    /// The nested type is tagged unless this type already is.
    ///
    /// # Errors
    /// Returns an error if the nested type cannot be attached or tagged.
    pub fn define_nested_type(&self, name: &str, flags: TypeAttributes) -> Result<TypeBuilder<'a>> {
        let nested = TypeDef::new("", name, flags);
        self.definition.add_nested_type(&nested)?;

        let tag = !self
            .system
            .marker()
            .is_tagged(self.system.resolver(), &self.definition.custom_attributes)?;
        self.system.create_type_builder(&nested, tag)
    }

    /// Set the base type
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a base type is already set.
    pub fn set_base_type(&self, base: &TypeReference) -> Result<()> {
        self.definition
            .set_base_type(self.module.import_type(base))
    }

    /// Declare an implemented interface
    pub fn add_interface(&self, interface: &TypeReference) {
        self.definition
            .interfaces
            .push(self.module.import_type(interface));
    }

    /// Finish building and return the abstract type
    #[must_use]
    pub fn create_type(&self) -> ClrTypeRc {
        self.system.type_of(&self.definition)
    }

    fn import_parameters(&self, parameters: Vec<ParameterDef>) -> Vec<ParameterDef> {
        parameters
            .into_iter()
            .map(|parameter| {
                ParameterDef::new(
                    parameter.name,
                    self.module.import_type(&parameter.parameter_type),
                )
            })
            .collect()
    }

    fn attach_method(&self, method: MethodDefRc) -> Result<MethodDefRc> {
        self.definition.add_method(&method)?;
        self.system
            .tag_compiler_generated(&Member::MethodDef(method.clone()))?;
        Ok(method)
    }
}
