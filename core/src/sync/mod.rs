//! Connection management and clipboard watching

pub mod connection;
pub mod watcher;

pub use connection::ConnectionManager;
pub use watcher::ClipboardWatcher;
