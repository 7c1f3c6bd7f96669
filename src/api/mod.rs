pub mod error;
pub mod tenant_extractor;

pub use error::*;
pub use tenant_extractor::*;
