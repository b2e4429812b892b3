//! Command implementations

pub mod dig;
pub mod list;
pub mod version;

pub use dig::*;
pub use list::*;
pub use version::*;
