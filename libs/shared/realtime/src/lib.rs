pub mod models;
pub mod notifier;
pub mod router;

pub use models::*;
pub use notifier::*;
pub use router::realtime_routes;
