//! File format handlers

pub mod nif;

pub use nif::{NifFile, NifHeader, ShapeRef};
