//! Read JVM classes
//!
//! There are two levels of representation:
//!
//!   - [`ClassFile`] is the raw structure of a `.class` file, with everything referring into the
//!     [`ConstantPool`] by index. It can be read with [`ClassFile::parse`] and written back with
//!     [`ClassFile::to_bytes`].
//!   - [`ClassDescriptor`] is the resolved view of a class: names, types, flags, and the
//!     attributes that matter for API comparisons.
//!
//! ### Simple example
//!
//! Consider the following simple Java class:
//!
//! ```java,ignore,no_run
//! public class Point {
//!     public int x;
//! }
//! ```
//!
//! Assembling and then reading back an analogous class file can be done as follows:
//!
//! ```
//! use jardiff::jvm::*;
//!
//! # fn assemble() -> Result<(), Box<dyn std::error::Error>> {
//! let mut constants = ConstantPoolBuilder::new();
//! let this_class = constants.get_class("me/Point")?;
//! let super_class = constants.get_class("java/lang/Object")?;
//! let field = Field {
//!     access_flags: FieldAccessFlags::PUBLIC,
//!     name_index: constants.get_utf8("x")?,
//!     descriptor_index: constants.get_utf8("I")?,
//!     attributes: vec![],
//! };
//!
//! let class_file = ClassFile {
//!     version: Version::JAVA8,
//!     constants: constants.finish(),
//!     access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
//!     this_class,
//!     super_class,
//!     interfaces: vec![],
//!     fields: vec![field],
//!     methods: vec![],
//!     attributes: vec![],
//! };
//! let bytes = class_file.to_bytes()?;
//!
//! let point = ClassDescriptor::parse(&bytes, &SupportedVersions::default())?;
//! assert_eq!(point.name, "me/Point");
//! assert_eq!(point.fields[0].java_declaration(), "public int x");
//! # Ok(())
//! # }
//! # assemble().unwrap();
//! ```

mod access_flags;
mod attributes;
mod binary_format;
mod class_file;
mod constants;
mod descriptors;
mod errors;
mod model;
mod version;

pub use access_flags::*;
pub use attributes::*;
pub use binary_format::*;
pub use class_file::*;
pub use constants::*;
pub use descriptors::*;
pub use errors::*;
pub use model::*;
pub use version::*;
