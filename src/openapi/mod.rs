//! OpenAPI document import

pub mod importer;
pub mod parser;

pub use importer::to_requests;
pub use parser::{parse, SpecFormat};
