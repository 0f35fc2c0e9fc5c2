pub mod session_handler;
pub mod write_handler;

pub use session_handler::*;
pub use write_handler::*;
