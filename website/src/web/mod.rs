mod health;
mod index;
mod routes;

pub use health::liveness_handler;
pub use index::index_handler;
pub use routes::all_routes;
