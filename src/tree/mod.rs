//! File tree construction and search
//!
//! - [`node`]: the [`FileNode`] data model
//! - [`filter`]: [`SearchCriteria`] and the compiled [`SearchFilter`]
//! - [`builder`]: the asynchronous recursive [`TreeBuilder`]

pub mod builder;
pub mod error;
pub mod filter;
pub mod node;

pub use builder::{BuildFailure, BuildOutput, TreeBuilder, WalkOptions};
pub use error::TreeError;
pub use filter::{SearchCriteria, SearchFilter};
pub use node::{FileNode, NodeKind, name_of};
