use std::sync::Arc;

use tracing::info;

use appointment_cell::store::{AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore};
use doctor_cell::store::{
    AvailabilityRuleStore, InMemoryAvailabilityRuleStore, InMemoryTimeOffStore, SupabaseAvailabilityRuleStore,
    SupabaseTimeOffStore, TimeOffStore,
};
use shared_config::AppConfig;
use shared_database::SupabaseClient;

/// The three stores every cell shares. Both cells must see the same
/// instances so the slot generator and the conflict guard agree.
pub struct Stores {
    pub rules: Arc<dyn AvailabilityRuleStore>,
    pub time_offs: Arc<dyn TimeOffStore>,
    pub appointments: Arc<dyn AppointmentStore>,
}

impl Stores {
    pub fn from_config(config: &AppConfig) -> Self {
        if config.is_configured() {
            info!("Using Supabase stores at {}", config.supabase_url);
            let supabase = SupabaseClient::new(config);
            Self {
                rules: Arc::new(SupabaseAvailabilityRuleStore::new(supabase.clone())),
                time_offs: Arc::new(SupabaseTimeOffStore::new(supabase.clone())),
                appointments: Arc::new(SupabaseAppointmentStore::new(supabase)),
            }
        } else {
            info!("Using in-memory stores; data is lost on restart");
            Self::in_memory()
        }
    }

    pub fn in_memory() -> Self {
        Self {
            rules: Arc::new(InMemoryAvailabilityRuleStore::new()),
            time_offs: Arc::new(InMemoryTimeOffStore::new()),
            appointments: Arc::new(InMemoryAppointmentStore::new()),
        }
    }
}
