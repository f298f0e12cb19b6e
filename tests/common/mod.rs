//! Helpers for assembling class files, JARs and class directories in tests

#![allow(dead_code)]

use jardiff::archive::ClassBytes;
use jardiff::jvm::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

/// Builder for small class files
pub struct ClassBuilder {
    constants: ConstantPoolBuilder,
    version: Version,
    access_flags: ClassAccessFlags,
    this_class: ClassConstantIndex,
    super_class: ClassConstantIndex,
    interfaces: Vec<ClassConstantIndex>,
    fields: Vec<Field>,
    methods: Vec<Method>,
    attributes: Vec<Attribute>,
}

impl ClassBuilder {
    pub fn new(name: &str) -> ClassBuilder {
        let mut constants = ConstantPoolBuilder::new();
        let this_class = constants.get_class(name).unwrap();
        let super_class = constants.get_class("java/lang/Object").unwrap();
        ClassBuilder {
            constants,
            version: Version::JAVA8,
            access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
            this_class,
            super_class,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        }
    }

    pub fn version(mut self, version: Version) -> ClassBuilder {
        self.version = version;
        self
    }

    pub fn access_flags(mut self, access_flags: ClassAccessFlags) -> ClassBuilder {
        self.access_flags = access_flags;
        self
    }

    pub fn super_class(mut self, name: &str) -> ClassBuilder {
        self.super_class = self.constants.get_class(name).unwrap();
        self
    }

    pub fn interface(mut self, name: &str) -> ClassBuilder {
        let interface = self.constants.get_class(name).unwrap();
        self.interfaces.push(interface);
        self
    }

    pub fn field(self, access_flags: FieldAccessFlags, name: &str, descriptor: &str) -> ClassBuilder {
        self.field_with(access_flags, name, descriptor, |_| vec![])
    }

    /// Add a field, with attributes built against the constant pool
    pub fn field_with<F>(
        mut self,
        access_flags: FieldAccessFlags,
        name: &str,
        descriptor: &str,
        attributes: F,
    ) -> ClassBuilder
    where
        F: FnOnce(&mut ConstantPoolBuilder) -> Vec<Attribute>,
    {
        let field = Field {
            access_flags,
            name_index: self.constants.get_utf8(name).unwrap(),
            descriptor_index: self.constants.get_utf8(descriptor).unwrap(),
            attributes: attributes(&mut self.constants),
        };
        self.fields.push(field);
        self
    }

    pub fn method(self, access_flags: MethodAccessFlags, name: &str, descriptor: &str) -> ClassBuilder {
        self.method_with(access_flags, name, descriptor, |_| vec![])
    }

    /// Add a method, with attributes built against the constant pool
    pub fn method_with<F>(
        mut self,
        access_flags: MethodAccessFlags,
        name: &str,
        descriptor: &str,
        attributes: F,
    ) -> ClassBuilder
    where
        F: FnOnce(&mut ConstantPoolBuilder) -> Vec<Attribute>,
    {
        let method = Method {
            access_flags,
            name_index: self.constants.get_utf8(name).unwrap(),
            descriptor_index: self.constants.get_utf8(descriptor).unwrap(),
            attributes: attributes(&mut self.constants),
        };
        self.methods.push(method);
        self
    }

    /// Mark the class as a member class of `outer`
    pub fn inner_of(mut self, outer: &str, simple_name: &str) -> ClassBuilder {
        let entry = InnerClass {
            inner_class: self.this_class,
            outer_class: self.constants.get_class(outer).unwrap(),
            inner_name: self.constants.get_utf8(simple_name).unwrap(),
            access_flags: InnerClassAccessFlags::empty(),
        };
        let attribute = self
            .constants
            .get_attribute(InnerClasses(vec![entry]))
            .unwrap();
        self.attributes.push(attribute);
        self
    }

    pub fn synthetic(mut self) -> ClassBuilder {
        let attribute = self.constants.get_attribute(Synthetic).unwrap();
        self.attributes.push(attribute);
        self
    }

    pub fn build(self) -> Vec<u8> {
        ClassFile {
            version: self.version,
            constants: self.constants.finish(),
            access_flags: self.access_flags,
            this_class: self.this_class,
            super_class: self.super_class,
            interfaces: self.interfaces,
            fields: self.fields,
            methods: self.methods,
            attributes: self.attributes,
        }
        .to_bytes()
        .unwrap()
    }
}

/// Attributes for a method that throws the given exceptions
pub fn throws(constants: &mut ConstantPoolBuilder, exceptions: &[&str]) -> Vec<Attribute> {
    let exceptions = exceptions
        .iter()
        .map(|name| constants.get_class(name).unwrap())
        .collect();
    vec![constants.get_attribute(Exceptions(exceptions)).unwrap()]
}

/// A plain `public class <name>` with a default constructor and an `int` field
pub fn simple_class(name: &str) -> Vec<u8> {
    ClassBuilder::new(name)
        .field(FieldAccessFlags::PUBLIC, "value", "I")
        .method(MethodAccessFlags::PUBLIC, "<init>", "()V")
        .build()
}

pub fn class_bytes(name: &str, bytes: Vec<u8>) -> ClassBytes {
    ClassBytes::new(name, bytes)
}

/// Write a JAR with the given entries, in order
pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

/// Write files under a directory, creating parent directories as needed
pub fn write_dir(root: &Path, entries: &[(&str, &[u8])]) {
    for (name, bytes) in entries {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, bytes).unwrap();
    }
}
