use super::{Member, MemberKind};
use crate::jvm::{
    java_class_name, serialize_flag_names, AccessFlagNames, AttributeLike, ConstantPool,
    Deprecated, Error, Exceptions, Method, MethodAccessFlags, MethodType, ParseDescriptor,
    Signature, Synthetic,
};
use serde::Serialize;

/// Method declared by a class or interface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDescriptor {
    /// Binary name of the class declaring the method
    pub owner: String,

    pub name: String,

    /// Parameter and return types (eg. `(ILjava/lang/String;)V`)
    pub descriptor: String,

    #[serde(serialize_with = "serialize_flag_names")]
    pub access_flags: MethodAccessFlags,

    /// Generic method signature
    ///
    /// [Format](https://docs.oracle.com/javase/specs/jvms/se11/html/jvms-4.html#jvms-4.7.9.1)
    pub signature: Option<String>,

    /// Binary names of the checked exceptions in the `throws` clause, in declaration order
    pub exceptions: Vec<String>,

    pub synthetic_attribute: bool,
    pub deprecated: bool,
}

impl MethodDescriptor {
    pub(super) fn resolve(
        owner: &str,
        method: &Method,
        constants: &ConstantPool,
    ) -> Result<MethodDescriptor, Error> {
        let exceptions = match Exceptions::find(&method.attributes, constants)? {
            Some(Exceptions(classes)) => classes
                .into_iter()
                .map(|class| constants.class_name(class).map(String::from))
                .collect::<Result<Vec<_>, Error>>()?,
            None => vec![],
        };
        let signature = match Signature::find(&method.attributes, constants)? {
            Some(Signature { signature }) => Some(constants.utf8(signature)?.to_owned()),
            None => None,
        };

        Ok(MethodDescriptor {
            owner: owner.to_owned(),
            name: constants.utf8(method.name_index)?.to_owned(),
            descriptor: constants.utf8(method.descriptor_index)?.to_owned(),
            access_flags: method.access_flags,
            signature,
            exceptions,
            synthetic_attribute: Synthetic::is_present(&method.attributes, constants)?,
            deprecated: Deprecated::is_present(&method.attributes, constants)?,
        })
    }

    /// Is the `ACC_BRIDGE` bit set?
    pub fn is_bridge(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::BRIDGE)
    }

    /// Is this an instance initializer (constructor)?
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }
}

impl Member for MethodDescriptor {
    const KIND: MemberKind = MemberKind::Method;

    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> &str {
        &self.descriptor
    }

    fn has_synthetic_flag(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::SYNTHETIC)
    }

    fn has_synthetic_attribute(&self) -> bool {
        self.synthetic_attribute
    }

    fn java_declaration(&self) -> String {
        if self.name == "<clinit>" {
            return String::from("static {}");
        }

        let mut declaration = String::new();
        for modifier in self.access_flags.source_modifiers() {
            declaration.push_str(modifier);
            declaration.push(' ');
        }

        let method_type = match MethodType::parse(&self.descriptor) {
            Ok(method_type) => method_type,
            Err(_) => {
                declaration.push_str(&self.name);
                declaration.push_str(&self.descriptor);
                return declaration;
            }
        };

        if self.is_constructor() {
            let simple_name = self.owner.rsplit('/').next().unwrap_or(&self.owner);
            declaration.push_str(simple_name);
        } else {
            declaration.push_str(&method_type.java_return_type());
            declaration.push(' ');
            declaration.push_str(&self.name);
        }
        declaration.push('(');
        declaration.push_str(&method_type.java_parameters());
        declaration.push(')');

        if !self.exceptions.is_empty() {
            let exceptions: Vec<String> = self
                .exceptions
                .iter()
                .map(|exception| java_class_name(exception))
                .collect();
            declaration.push_str(" throws ");
            declaration.push_str(&exceptions.join(", "));
        }
        declaration
    }
}
