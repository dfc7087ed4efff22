use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{AvailabilityError, BookedInterval};

pub struct BookingLookupService {
    supabase: Arc<SupabaseClient>,
}

impl BookingLookupService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Active booked intervals for the doctor at the clinic on a date, sorted
    /// by start time. An appointment being rescheduled can be excluded so its
    /// own time is offered back.
    pub async fn booked_for_date(
        &self,
        doctor_id: Uuid,
        clinic_id: Uuid,
        date: NaiveDate,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<Vec<BookedInterval>, AvailabilityError> {
        let mut query_parts = vec![
            format!("doctor_id=eq.{}", doctor_id),
            format!("clinic_id=eq.{}", clinic_id),
            format!("date=eq.{}", date),
            "status=in.(pending,confirmed,checked_in)".to_string(),
        ];

        if let Some(exclude_id) = exclude_appointment_id {
            query_parts.push(format!("id=neq.{}", exclude_id));
        }

        let path = format!("/rest/v1/appointments?{}&order=start_time.asc",
                          query_parts.join("&"));

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
            None,
        ).await.map_err(|e| AvailabilityError::Database(e.to_string()))?;

        let mut intervals: Vec<BookedInterval> = result.into_iter()
            .filter_map(|row| match serde_json::from_value::<BookedInterval>(row) {
                Ok(interval) => Some(interval),
                Err(e) => {
                    warn!("Skipping malformed appointment row: {}", e);
                    None
                }
            })
            .collect();

        // Chunking requires ascending start order.
        intervals.sort_by_key(|interval| interval.start_time);

        debug!("Found {} booked intervals for doctor {} on {}",
               intervals.len(), doctor_id, date);
        Ok(intervals)
    }
}
