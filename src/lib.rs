pub mod audio;
pub mod catalog;
pub mod common;
pub mod configs;
pub mod playout;
pub mod server;
pub mod transport;
