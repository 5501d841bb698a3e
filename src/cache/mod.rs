//! Release cache abstraction consulted by the fast path
//!
//! The persistent store and its read-through cache live outside this crate.
//! The watch center only needs to ask "what is the active release of file F".

mod memory;
pub use memory::*;


#[cfg(test)]
use mockall::automock;

use crate::ConfigFileRelease;

#[cfg_attr(test, automock)]
pub trait ConfigFileCache: Send + Sync + 'static {
    /// Returns the currently active release of a file, if any
    fn get_active_release(
        &self,
        namespace: &str,
        group: &str,
        file_name: &str,
    ) -> Option<ConfigFileRelease>;
}
