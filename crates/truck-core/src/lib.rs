//! Truck file format engine.
//!
//! [`parse_truck`] turns truck file text into a [`Document`] plus
//! [`Diagnostics`]; [`serialize_document`] writes a document back out.
//! [`format_truck`] chains both into a canonicalising round trip.

pub mod args;
pub mod defaults;
pub mod diagnostics;
pub mod document;
pub mod format;
pub mod importer;
pub mod keyword;
pub mod model;
pub mod node;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

pub use diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, LogSink, Severity, TeeSink};
pub use document::{Document, Module, ROOT_MODULE_NAME};
pub use format::{FormatConfig, format_truck};
pub use keyword::{Keyword, identify};
pub use node::{NodeId, NodeName, NodeRange, NodeRef};
pub use parser::{ParseOutput, Parser, ParserConfig, parse_truck, parse_truck_with_sink};
pub use serializer::{SerializeError, SerializerConfig, serialize_document};
