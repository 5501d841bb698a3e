//! Value types shared by the watch center and its collaborators
mod file;
mod response;

pub use file::*;
pub use response::*;
