//! Token identifiers, bound references, and issued token records.

pub mod id;
pub mod record;
pub mod reference;

pub use id::*;
pub use record::*;
pub use reference::*;
