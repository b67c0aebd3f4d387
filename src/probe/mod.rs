pub mod remote;
pub mod tools;

pub use remote::{HttpProbe, RemoteSizeProbe};
pub use tools::{SpawnProbe, StaticProbe, ToolProbe};
