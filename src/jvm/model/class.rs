use super::{FieldDescriptor, Member, MethodDescriptor};
use crate::jvm::{
    serialize_flag_names, AttributeLike, ClassAccessFlags, ClassFile, ClassFileDefect,
    Deprecated, EnclosingMethod, Error, InnerClasses, Signature, SupportedVersions, Synthetic,
    Version,
};
use serde::Serialize;
use std::collections::HashSet;

/// Structure of one class, as far as comparing APIs is concerned
///
/// Instruction bodies are not kept. Inner/outer relationships are recorded by name only: finding
/// the outer class itself means looking it up by name in whatever set of classes is at hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDescriptor {
    /// Binary name (eg. `java/util/Map$Entry`)
    pub name: String,

    pub version: Version,

    #[serde(serialize_with = "serialize_flag_names")]
    pub access_flags: ClassAccessFlags,

    /// Binary name of the superclass (only `java/lang/Object` and modules have none)
    pub super_class: Option<String>,

    /// Binary names of direct superinterfaces, in declaration order
    pub interfaces: Vec<String>,

    pub fields: Vec<FieldDescriptor>,
    pub methods: Vec<MethodDescriptor>,

    /// Binary name of the enclosing class, for nested, local, and anonymous classes
    pub outer_class: Option<String>,

    /// Generic class signature
    pub signature: Option<String>,

    pub synthetic_attribute: bool,
    pub deprecated: bool,
}

impl ClassDescriptor {
    /// Parse a class file and resolve it into a descriptor
    pub fn parse(bytes: &[u8], supported: &SupportedVersions) -> Result<ClassDescriptor, Error> {
        let class_file = ClassFile::parse(bytes, supported)?;
        ClassDescriptor::from_class_file(&class_file)
    }

    /// Resolve all of the constant pool references of an already read class file
    pub fn from_class_file(class_file: &ClassFile) -> Result<ClassDescriptor, Error> {
        let constants = &class_file.constants;
        let name = constants.class_name(class_file.this_class)?.to_owned();
        let super_class = constants
            .optional_class_name(class_file.super_class)?
            .map(String::from);
        let interfaces = class_file
            .interfaces
            .iter()
            .map(|interface| constants.class_name(*interface).map(String::from))
            .collect::<Result<Vec<_>, Error>>()?;

        let fields = class_file
            .fields
            .iter()
            .map(|field| FieldDescriptor::resolve(&name, field, constants))
            .collect::<Result<Vec<_>, Error>>()?;
        check_unique(&fields)?;

        let methods = class_file
            .methods
            .iter()
            .map(|method| MethodDescriptor::resolve(&name, method, constants))
            .collect::<Result<Vec<_>, Error>>()?;
        check_unique(&methods)?;

        let attributes = &class_file.attributes;
        let outer_class = ClassDescriptor::resolve_outer_class(&name, class_file)?;
        let signature = match Signature::find(attributes, constants)? {
            Some(Signature { signature }) => Some(constants.utf8(signature)?.to_owned()),
            None => None,
        };

        Ok(ClassDescriptor {
            name,
            version: class_file.version,
            access_flags: class_file.access_flags,
            super_class,
            interfaces,
            fields,
            methods,
            outer_class,
            signature,
            synthetic_attribute: Synthetic::is_present(attributes, constants)?,
            deprecated: Deprecated::is_present(attributes, constants)?,
        })
    }

    /// Find the enclosing class
    ///
    /// Member classes name their outer class in their own `InnerClasses` entry. Local and anonymous
    /// classes leave that blank, but carry an `EnclosingMethod` attribute instead.
    fn resolve_outer_class(name: &str, class_file: &ClassFile) -> Result<Option<String>, Error> {
        let constants = &class_file.constants;
        let attributes = &class_file.attributes;

        if let Some(InnerClasses(inner_classes)) = InnerClasses::find(attributes, constants)? {
            for inner_class in inner_classes {
                if constants.class_name(inner_class.inner_class)? != name {
                    continue;
                }
                if let Some(outer) = constants.optional_class_name(inner_class.outer_class)? {
                    return Ok(Some(outer.to_owned()));
                }
                break;
            }
        }

        match EnclosingMethod::find(attributes, constants)? {
            Some(enclosing) => Ok(Some(constants.class_name(enclosing.class)?.to_owned())),
            None => Ok(None),
        }
    }

    /// `ACC_SYNTHETIC` is set or the `Synthetic` attribute is present
    pub fn is_synthetic(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::SYNTHETIC) || self.synthetic_attribute
    }

    /// Is this class nested inside another one?
    pub fn has_outer_class(&self) -> bool {
        self.outer_class.is_some()
    }
}

fn check_unique<M: Member>(members: &[M]) -> Result<(), Error> {
    let mut seen = HashSet::new();
    for member in members {
        if !seen.insert((member.name(), member.descriptor())) {
            return Err(Error::MalformedClassFile(
                ClassFileDefect::DuplicateMember {
                    name: member.name().to_owned(),
                    descriptor: member.descriptor().to_owned(),
                },
            ));
        }
    }
    Ok(())
}
