pub mod book;
pub mod common;
pub mod critic;

pub use book::*;
pub use common::*;
pub use critic::*;
