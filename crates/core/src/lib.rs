//! Fundraiser core types: credentials, persisted client state and errors

pub mod credentials;
pub mod error;
pub mod session;
pub mod storage;

pub use credentials::{ACCESS_TOKEN_KEY, Credentials, REFRESH_TOKEN_KEY, USER_KEY, UserProfile};
pub use error::{CoreError, CoreResult};
pub use session::Session;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
