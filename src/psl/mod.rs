pub mod auto_loader;
pub mod list;
pub mod loader;

pub use auto_loader::AutoSuffixLoader;
pub use list::PublicSuffixList;
pub use loader::{
    FileSuffixLoader, MemorySuffixLoader, NilSuffixLoader, SuffixLoader,
    DEFAULT_SUFFIX_LIST_FILENAME, DEFAULT_SUFFIX_LIST_URL, DEFAULT_UPDATE_INTERVAL,
};
