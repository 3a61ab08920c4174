//! Concrete extension implementations
//!
//! Both types keep the default directory-copy read and write hooks of
//! [`Extension`](crate::Extension); they differ only in how they are named.

mod cura;
mod directory;

pub use cura::{CURA_DIRECTORY, CuraExtension};
pub use directory::DirectoryExtension;
