pub mod status;
pub mod stream;

pub use status::get_status;
pub use stream::catalog_stream;
