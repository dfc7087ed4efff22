use std::sync::Arc;

use futures::future::try_join_all;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{AvailabilityError, ServiceDurationMapping};

pub struct DurationService {
    supabase: Arc<SupabaseClient>,
}

impl DurationService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Total minutes the requested services take for this doctor and clinic.
    /// Services without a usable mapping contribute nothing.
    pub async fn total_duration(
        &self,
        service_ids: &[Uuid],
        doctor_id: Uuid,
        clinic_id: Uuid,
    ) -> Result<i64, AvailabilityError> {
        if service_ids.is_empty() {
            return Ok(0);
        }

        let lookups = service_ids.iter()
            .map(|service_id| self.duration_for_service(*service_id, doctor_id, clinic_id));

        let durations = try_join_all(lookups).await?;
        let total = durations.into_iter().sum();

        debug!("Total duration for {} requested services: {} minutes", service_ids.len(), total);
        Ok(total)
    }

    async fn duration_for_service(
        &self,
        service_id: Uuid,
        doctor_id: Uuid,
        clinic_id: Uuid,
    ) -> Result<i64, AvailabilityError> {
        let path = format!(
            "/rest/v1/service_durations?service_id=eq.{}&doctor_id=eq.{}&clinic_id=eq.{}",
            service_id, doctor_id, clinic_id
        );

        let rows: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
            None,
        ).await.map_err(|e| AvailabilityError::Database(e.to_string()))?;

        let duration = rows.into_iter()
            .filter_map(|row| match serde_json::from_value::<ServiceDurationMapping>(row) {
                Ok(mapping) => Some(mapping),
                Err(e) => {
                    warn!("Skipping malformed service duration row: {}", e);
                    None
                }
            })
            .map(|mapping| mapping.duration_minutes)
            .find(|minutes| *minutes > 0)
            .unwrap_or(0);

        Ok(duration)
    }
}
