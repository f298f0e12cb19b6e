//! Compare classes
//!
//! Comparing two versions of a class happens in three steps:
//!
//!   1. both versions are parsed into [`ClassDescriptor`](crate::jvm::ClassDescriptor)s
//!   2. every member gets a [`Classification`] (is it something a developer wrote, or something
//!      the compiler made up?)
//!   3. members are matched by name and descriptor, and the differences between them become
//!      [`Change`]s
//!
//! The [`Differ`] runs that for every class in two sets of classes, in parallel, and collects the
//! outcomes into a [`DiffReport`].

mod change;
mod classify;
mod differ;
mod engine;
mod errors;
mod report;
mod settings;

pub use change::*;
pub use classify::*;
pub use differ::*;
pub use engine::*;
pub use errors::*;
pub use report::*;
pub use settings::*;
