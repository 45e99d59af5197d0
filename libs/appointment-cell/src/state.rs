use std::sync::Arc;

use doctor_cell::store::{AvailabilityRuleStore, TimeOffStore};
use shared_config::AppConfig;

use crate::services::AppointmentBookingService;
use crate::store::AppointmentStore;

pub struct AppointmentCellState {
    pub booking: AppointmentBookingService,
}

impl AppointmentCellState {
    pub fn new(
        config: &AppConfig,
        appointments: Arc<dyn AppointmentStore>,
        rules: Arc<dyn AvailabilityRuleStore>,
        time_offs: Arc<dyn TimeOffStore>,
    ) -> Self {
        Self {
            booking: AppointmentBookingService::new(config, appointments, rules, time_offs),
        }
    }
}
