//! Link implementations
//!
//! - [`MemoryLink`] - in-process ports wired together with channels
//! - [`RawLink`] - real interfaces through pnet datalink channels

pub mod memory;
pub mod raw;

pub use memory::MemoryLink;
pub use raw::RawLink;
