//! Command generation from catalog templates

pub mod builder;
pub mod template;

pub use builder::{CommandBuilder, ResolvedCommand};
