//! Infrastructure Layer
//!
//! Repository implementations over in-process and key-value backends.

pub mod memory;
pub mod session_store;

pub use memory::InMemoryUserRepository;
pub use session_store::KvSessionStore;
