use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::{AvailabilityService, TimeOffService};
use crate::store::{AvailabilityRuleStore, BookingLedger, TimeOffStore};

/// Services shared by every doctor-cell handler.
pub struct DoctorCellState {
    pub availability: AvailabilityService,
    pub time_off: TimeOffService,
}

impl DoctorCellState {
    pub fn new(
        config: &AppConfig,
        rules: Arc<dyn AvailabilityRuleStore>,
        time_offs: Arc<dyn TimeOffStore>,
        ledger: Arc<dyn BookingLedger>,
    ) -> Self {
        Self {
            availability: AvailabilityService::new(config, rules, ledger),
            time_off: TimeOffService::new(config, time_offs),
        }
    }
}
