pub mod index;
pub mod memstore;
pub mod pattern;
pub mod source;

pub use index::PrefixIndex;
pub use memstore::MemStore;
pub use pattern::Pattern;
pub use source::FileSource;
