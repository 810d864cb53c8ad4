//! Types kept in the visitor's session.

pub mod session;

pub use session::{Notice, NoticeLevel, keys as session_keys};
