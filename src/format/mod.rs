pub mod classifier;
pub mod command;

pub use classifier::{classify, classify_path, strip_known_suffixes, ArchiveFormat, FORMAT_TABLE};
pub use command::ArchiveCommand;
