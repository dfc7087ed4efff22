use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{AvailabilityError, ExceptionModule, ExceptionPeriod, ExceptionStatus};

pub struct ExceptionService {
    supabase: Arc<SupabaseClient>,
}

impl ExceptionService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Whether a clinic holiday or doctor leave period blocks the whole date.
    pub async fn is_closed(
        &self,
        clinic_id: Uuid,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, AvailabilityError> {
        let path = format!(
            "/rest/v1/exception_periods?status=eq.active&start_date=lte.{}&end_date=gte.{}&or=(and(module_type.eq.clinic,module_id.eq.{}),and(module_type.eq.doctor,module_id.eq.{}))",
            date, date, clinic_id, doctor_id
        );

        let rows: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
            None,
        ).await.map_err(|e| AvailabilityError::Database(e.to_string()))?;

        let periods: Vec<ExceptionPeriod> = rows.into_iter()
            .filter_map(|row| match serde_json::from_value::<ExceptionPeriod>(row) {
                Ok(period) => Some(period),
                Err(e) => {
                    warn!("Skipping malformed exception period row: {}", e);
                    None
                }
            })
            .collect();

        let closed = closes_date(&periods, clinic_id, doctor_id, date);
        if closed {
            debug!("Date {} is closed for doctor {} at clinic {}", date, doctor_id, clinic_id);
        }

        Ok(closed)
    }
}

/// The fetch already narrows by date, status and scope; rows are re-checked
/// here so a period for an unrelated clinic or doctor never closes the date.
pub fn closes_date(
    periods: &[ExceptionPeriod],
    clinic_id: Uuid,
    doctor_id: Uuid,
    date: NaiveDate,
) -> bool {
    periods.iter().any(|period| {
        period.status == ExceptionStatus::Active
            && period.start_date <= date
            && period.end_date >= date
            && match period.module_type {
                ExceptionModule::Clinic => period.module_id == clinic_id,
                ExceptionModule::Doctor => period.module_id == doctor_id,
            }
    })
}
