pub mod base;
pub mod logging;
pub mod playout;
pub mod server;

pub use base::*;
pub use logging::*;
pub use playout::*;
pub use server::*;
