mod session;
mod session_registry;

pub use session::{Session, SessionState};
pub use session_registry::SessionRegistry;
