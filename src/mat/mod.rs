//! # MAT-file Module
//!
//! Reading and writing of MATLAB Level 5 MAT-files, the binary container that
//! holds named, typed, dimensioned array variables.
//!
//! ## Supported Content
//!
//! - Numeric matrices of every storage class, real or complex, and logical arrays
//! - Character arrays stored as UTF-8, UTF-16, UTF-32 or 8/16-bit code units
//! - Cell arrays, structs and object structs (nested to any depth)
//! - Sparse matrices in compressed-column form (read only)
//! - Function handles and opaque/foreign objects
//! - Per-variable zlib compression (`miCOMPRESSED`, MATLAB `-v7`)
//!
//! HDF5-based v7.3 files and Level 4 files are rejected with
//! [`MatError::UnsupportedFormat`].
//!
//! The pipeline only depends on the [`ContainerReader`] trait, so any other
//! source of [`ArrayEntry`] trees can be plugged in.

mod error;
mod format;
mod model;
mod reader;
mod writer;


pub use error::MatError;
pub use format::Endian;
pub use model::*;
pub use reader::{ContainerReader, Mat5Reader, MatFile, MatHeader};
pub use writer::Mat5Writer;
