pub mod doctor;
pub mod store;
pub mod supabase;

pub use doctor::*;
pub use store::*;
pub use supabase::*;
