pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use handlers::SessionsState;
pub use routes::routes;
pub use services::SessionRegistry;
