//! 핸들러 모듈

pub mod chat;
pub mod connection;
pub mod editor;
pub mod room;
pub mod signaling;
pub mod typing;

pub use chat::*;
pub use connection::*;
pub use editor::*;
pub use room::*;
pub use signaling::*;
pub use typing::*;
