//! tlbridge: converts TestLink test cases between flat CSV rows and
//! hierarchical XML documents.
//!
//! The conversion core (`schema`, `table`, `document`, `markup`, `pipeline`)
//! works on in-memory rows and document text. `io` and `cli` are the file
//! and command-line collaborators around it.

pub use crate::diagnostics::{Diagnostic, Diagnostics};
pub use crate::errors::{ConvertError, ErrorKind};
pub use crate::pipeline::{Conversion, ConversionPipeline};
pub use crate::schema::{Field, LabelPreset, Schema};
pub use crate::table::Row;

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod errors;
pub mod io;
pub mod markup;
pub mod pipeline;
pub mod schema;
pub mod table;
