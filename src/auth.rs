//! Auth-domain identifiers, scope lists, caller identity, and token values.

pub mod id;
pub mod scope;
pub mod subject;
pub mod token;

pub use id::*;
pub use scope::*;
pub use subject::*;
pub use token::*;
