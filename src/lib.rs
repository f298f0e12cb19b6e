//! Structural differences between two versions of a set of JVM classes
//!
//! Rather than comparing bytes, classes are compared the way a Java developer would: which
//! fields and methods were added or removed, and which ones changed their modifiers, generic
//! signatures, thrown exceptions, or constant values. Members that the compiler generated (bridge
//! methods, accessors, outer instance fields) are left out unless explicitly requested.

pub mod archive;
pub mod diff;
pub mod jvm;
pub mod util;
