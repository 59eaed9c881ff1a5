// folio-common: shared types and utilities for the Folio workspace

pub mod protocol;
pub mod tree;
pub mod types;
