//! Catalog database access

pub mod init;
pub mod lookup;

pub use init::*;
pub use lookup::*;
