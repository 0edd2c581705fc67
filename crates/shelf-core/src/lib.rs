pub mod book;
pub mod display;
pub mod errors;
pub mod source;

pub use book::{BookRecord, PagePerCost};
pub use display::{BookView, PresentationSink};
pub use errors::SourceError;
pub use source::{BookSource, ExplanationSource};
