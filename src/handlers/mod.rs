//! Handler modules

pub mod connection;
pub mod draw;
pub mod room;

pub use connection::*;
pub use draw::*;
pub use room::*;
