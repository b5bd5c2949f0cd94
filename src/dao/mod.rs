//! Session storage abstraction and the in-memory backend.
pub mod storage;
