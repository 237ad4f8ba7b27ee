mod discovery;
/// Documents discovered on disk.
pub mod document;
mod relative;

pub use discovery::{discover, sort_documents};
pub use document::Document;
pub use relative::relative_link;
