use crate::jvm::{ClassDescriptor, FieldDescriptor, Member, MemberId, MethodDescriptor};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Where a class or member comes from
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// Written in the source code
    SourceDeclared,

    /// Inserted by the compiler (outer instance references, accessors, etc.)
    CompilerSynthetic,

    /// Inserted by the compiler to make overriding work after generic types are erased
    Bridge,
}

impl Classification {
    pub fn is_source_declared(self) -> bool {
        self == Classification::SourceDeclared
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Classification::SourceDeclared => "source-declared",
            Classification::CompilerSynthetic => "compiler-synthetic",
            Classification::Bridge => "bridge",
        })
    }
}

/// Classification of a class and of each of its members
///
/// This is kept next to the [`ClassDescriptor`] rather than inside of it, so that descriptors
/// stay a faithful account of what the class file says.
#[derive(Debug, Clone, PartialEq)]
pub struct Classifications {
    class: Classification,
    members: HashMap<MemberId, Classification>,
}

impl Classifications {
    /// Classification of the class itself
    pub fn class(&self) -> Classification {
        self.class
    }

    /// Classification of a member (members that weren't classified count as source declared)
    pub fn member(&self, id: &MemberId) -> Classification {
        self.members
            .get(id)
            .copied()
            .unwrap_or(Classification::SourceDeclared)
    }

    pub fn of<M: Member>(&self, member: &M) -> Classification {
        self.member(&member.id())
    }
}

/// Classify a class and all of its members
///
/// Compilers have not been consistent in how they mark what they generate (older `javac`
/// versions set neither `ACC_SYNTHETIC` nor the `Synthetic` attribute on outer instance fields),
/// so on top of the flags, a couple of naming conventions are recognized. The checks are applied
/// in this order, and the first one that matches wins:
///
///   1. methods with `ACC_BRIDGE` are [`Classification::Bridge`]
///   2. members with `ACC_SYNTHETIC` or a `Synthetic` attribute are compiler synthetic
///   3. fields whose name starts with `this$<digits>` in nested classes are compiler synthetic
///   4. methods whose name starts with `access$<digits>` are compiler synthetic
///   5. everything else is source declared
pub fn classify(class: &ClassDescriptor) -> Classifications {
    let class_classification = if class.is_synthetic() {
        Classification::CompilerSynthetic
    } else {
        Classification::SourceDeclared
    };

    let mut members = HashMap::with_capacity(class.fields.len() + class.methods.len());
    for field in &class.fields {
        members.insert(field.id(), classify_field(class, field));
    }
    for method in &class.methods {
        members.insert(method.id(), classify_method(method));
    }

    Classifications {
        class: class_classification,
        members,
    }
}

fn classify_field(class: &ClassDescriptor, field: &FieldDescriptor) -> Classification {
    if is_marked_synthetic(field)
        || (class.has_outer_class() && has_numbered_name(&field.name, "this$"))
    {
        Classification::CompilerSynthetic
    } else {
        Classification::SourceDeclared
    }
}

fn classify_method(method: &MethodDescriptor) -> Classification {
    if method.is_bridge() {
        Classification::Bridge
    } else if is_marked_synthetic(method) || has_numbered_name(&method.name, "access$") {
        Classification::CompilerSynthetic
    } else {
        Classification::SourceDeclared
    }
}

fn is_marked_synthetic<M: Member>(member: &M) -> bool {
    member.has_synthetic_flag() || member.has_synthetic_attribute()
}

/// Does the name start with the prefix followed by at least one ASCII digit?
///
/// Anything after the digits is ignored: `javac` appends `$` to `this$0` when the name is taken.
fn has_numbered_name(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some(suffix) => suffix.bytes().next().map_or(false, |b| b.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags, Version};

    fn class(outer_class: Option<&str>) -> ClassDescriptor {
        ClassDescriptor {
            name: String::from("a/Outer$Inner"),
            version: Version::JAVA8,
            access_flags: ClassAccessFlags::SUPER,
            super_class: Some(String::from("java/lang/Object")),
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            outer_class: outer_class.map(String::from),
            signature: None,
            synthetic_attribute: false,
            deprecated: false,
        }
    }

    fn field(name: &str, access_flags: FieldAccessFlags) -> FieldDescriptor {
        FieldDescriptor {
            owner: String::from("a/Outer$Inner"),
            name: name.to_owned(),
            descriptor: String::from("La/Outer;"),
            access_flags,
            signature: None,
            constant_value: None,
            synthetic_attribute: false,
            deprecated: false,
        }
    }

    fn method(name: &str, access_flags: MethodAccessFlags) -> MethodDescriptor {
        MethodDescriptor {
            owner: String::from("a/Outer$Inner"),
            name: name.to_owned(),
            descriptor: String::from("()V"),
            access_flags,
            signature: None,
            exceptions: vec![],
            synthetic_attribute: false,
            deprecated: false,
        }
    }

    #[test]
    fn outer_instance_field_without_flag() {
        let mut inner = class(Some("a/Outer"));
        inner.fields.push(field("this$0", FieldAccessFlags::FINAL));
        inner.fields.push(field("this$", FieldAccessFlags::FINAL));
        inner.fields.push(field("this$0x", FieldAccessFlags::FINAL));
        inner.fields.push(field("this$0$", FieldAccessFlags::FINAL));
        inner.fields.push(field("this$outer", FieldAccessFlags::FINAL));
        let classifications = classify(&inner);
        assert_eq!(
            classifications.of(&inner.fields[0]),
            Classification::CompilerSynthetic
        );
        assert_eq!(
            classifications.of(&inner.fields[1]),
            Classification::SourceDeclared
        );
        assert_eq!(
            classifications.of(&inner.fields[2]),
            Classification::CompilerSynthetic
        );
        assert_eq!(
            classifications.of(&inner.fields[3]),
            Classification::CompilerSynthetic
        );
        assert_eq!(
            classifications.of(&inner.fields[4]),
            Classification::SourceDeclared
        );

        // Same field on a top level class is just a field with an odd name
        let mut top = class(None);
        top.fields.push(field("this$0", FieldAccessFlags::FINAL));
        assert_eq!(
            classify(&top).of(&top.fields[0]),
            Classification::SourceDeclared
        );
    }

    #[test]
    fn bridge_wins_over_synthetic() {
        let mut class = class(None);
        class.methods.push(method(
            "compareTo",
            MethodAccessFlags::PUBLIC | MethodAccessFlags::BRIDGE | MethodAccessFlags::SYNTHETIC,
        ));
        assert_eq!(classify(&class).of(&class.methods[0]), Classification::Bridge);
    }

    #[test]
    fn synthetic_attribute_counts_like_the_flag() {
        let mut class = class(None);
        let mut accessor = method("lambda$run$0", MethodAccessFlags::PRIVATE);
        accessor.synthetic_attribute = true;
        class.methods.push(accessor);
        class.fields.push(field("$assertionsDisabled", FieldAccessFlags::SYNTHETIC));
        let classifications = classify(&class);
        assert_eq!(
            classifications.of(&class.methods[0]),
            Classification::CompilerSynthetic
        );
        assert_eq!(
            classifications.of(&class.fields[0]),
            Classification::CompilerSynthetic
        );
    }

    #[test]
    fn accessor_naming_convention() {
        let mut class = class(None);
        class.methods.push(method("access$000", MethodAccessFlags::STATIC));
        class.methods.push(method("access$setup", MethodAccessFlags::PUBLIC));
        class.methods.push(method("access$", MethodAccessFlags::PUBLIC));
        let classifications = classify(&class);
        assert_eq!(
            classifications.of(&class.methods[0]),
            Classification::CompilerSynthetic
        );
        assert_eq!(
            classifications.of(&class.methods[1]),
            Classification::SourceDeclared
        );
        assert_eq!(
            classifications.of(&class.methods[2]),
            Classification::SourceDeclared
        );
    }

    #[test]
    fn class_level_classification() {
        let mut switch_map = class(Some("a/Outer"));
        assert_eq!(classify(&switch_map).class(), Classification::SourceDeclared);

        switch_map.access_flags |= ClassAccessFlags::SYNTHETIC;
        assert_eq!(
            classify(&switch_map).class(),
            Classification::CompilerSynthetic
        );

        let mut old_style = class(None);
        old_style.synthetic_attribute = true;
        assert_eq!(
            classify(&old_style).class(),
            Classification::CompilerSynthetic
        );
    }
}
