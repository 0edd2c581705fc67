pub mod mock;
pub mod preloaded;
pub mod remote;

pub use mock::{MockBookSource, MockExplanationSource};
pub use preloaded::{EmbeddedExplanations, PreloadedCatalog};
pub use remote::RemoteCatalog;
