pub mod error;
pub mod supabase;

pub use error::StoreError;
pub use supabase::{timestamp_param, SupabaseClient};
