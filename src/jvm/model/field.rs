use super::{Member, MemberKind};
use crate::jvm::{
    serialize_flag_names, AccessFlagNames, AttributeLike, ConstantPool, ConstantValue, Deprecated,
    Error, Field, FieldAccessFlags, FieldType, ParseDescriptor, Signature, Synthetic,
};
use serde::Serialize;

/// Field declared by a class or interface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Binary name of the class declaring the field
    pub owner: String,

    pub name: String,

    /// Type descriptor (eg. `[Ljava/lang/String;`)
    pub descriptor: String,

    #[serde(serialize_with = "serialize_flag_names")]
    pub access_flags: FieldAccessFlags,

    /// Generic signature
    ///
    /// [Format](https://docs.oracle.com/javase/specs/jvms/se11/html/jvms-4.html#jvms-4.7.9.1)
    pub signature: Option<String>,

    /// Initial value of a constant field, as a Java literal
    pub constant_value: Option<String>,

    pub synthetic_attribute: bool,
    pub deprecated: bool,
}

impl FieldDescriptor {
    pub(super) fn resolve(
        owner: &str,
        field: &Field,
        constants: &ConstantPool,
    ) -> Result<FieldDescriptor, Error> {
        let constant_value = match ConstantValue::find(&field.attributes, constants)? {
            Some(ConstantValue(index)) => Some(constants.render_field_constant(index)?),
            None => None,
        };
        let signature = match Signature::find(&field.attributes, constants)? {
            Some(Signature { signature }) => Some(constants.utf8(signature)?.to_owned()),
            None => None,
        };

        Ok(FieldDescriptor {
            owner: owner.to_owned(),
            name: constants.utf8(field.name_index)?.to_owned(),
            descriptor: constants.utf8(field.descriptor_index)?.to_owned(),
            access_flags: field.access_flags,
            signature,
            constant_value,
            synthetic_attribute: Synthetic::is_present(&field.attributes, constants)?,
            deprecated: Deprecated::is_present(&field.attributes, constants)?,
        })
    }
}

impl Member for FieldDescriptor {
    const KIND: MemberKind = MemberKind::Field;

    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> &str {
        &self.descriptor
    }

    fn has_synthetic_flag(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::SYNTHETIC)
    }

    fn has_synthetic_attribute(&self) -> bool {
        self.synthetic_attribute
    }

    fn java_declaration(&self) -> String {
        let mut declaration = String::new();
        for modifier in self.access_flags.source_modifiers() {
            declaration.push_str(modifier);
            declaration.push(' ');
        }
        match FieldType::parse(&self.descriptor) {
            Ok(typ) => declaration.push_str(&typ.java_source()),
            Err(_) => declaration.push_str(&self.descriptor),
        }
        declaration.push(' ');
        declaration.push_str(&self.name);
        if let Some(value) = &self.constant_value {
            declaration.push_str(" = ");
            declaration.push_str(value);
        }
        declaration
    }
}
