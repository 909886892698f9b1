pub mod allocation;
pub mod clock;
pub mod ledger;
pub mod queue;
pub mod supabase;

pub use allocation::*;
pub use clock::*;
pub use ledger::*;
pub use queue::*;
pub use supabase::*;
