mod args;
pub mod classes;
pub mod handler;
#[cfg(test)]
pub(crate) mod mock;
pub mod objects;
pub mod packages;
pub mod registry;

pub use classes::GetClassStructure;
pub use handler::AdtTool;
pub use objects::{
    FindWhereUsed, GetObjectInfo, GetObjectPath, GetObjectSource, GetObjectVersions,
    SearchObjects,
};
pub use packages::GetPackageContents;
pub use registry::ToolRegistry;
