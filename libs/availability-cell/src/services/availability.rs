use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AvailabilityError, SessionSlots, SlotQuery};
use crate::services::bookings::BookingLookupService;
use crate::services::durations::DurationService;
use crate::services::exceptions::ExceptionService;
use crate::services::schedule::ScheduleService;
use crate::services::slots::{free_chunks, quantize_chunk};

pub struct AvailabilityService {
    schedule_service: ScheduleService,
    exception_service: ExceptionService,
    duration_service: DurationService,
    booking_service: BookingLookupService,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));

        Self {
            schedule_service: ScheduleService::new(Arc::clone(&supabase)),
            exception_service: ExceptionService::new(Arc::clone(&supabase)),
            duration_service: DurationService::new(Arc::clone(&supabase)),
            booking_service: BookingLookupService::new(supabase),
        }
    }

    /// Compute bookable slots with the clock pinned to the current local wall
    /// time. Stored session and booking times are clinic-local.
    pub async fn compute_slots(
        &self,
        query: &SlotQuery,
    ) -> Result<Vec<SessionSlots>, AvailabilityError> {
        self.compute_slots_at(query, Local::now().naive_local()).await
    }

    /// Compute bookable slots against an explicit `now`. One slot group per
    /// working session, in session order; a closed or unresolvable day gives
    /// an empty list rather than an error.
    pub async fn compute_slots_at(
        &self,
        query: &SlotQuery,
        now: NaiveDateTime,
    ) -> Result<Vec<SessionSlots>, AvailabilityError> {
        let (date, doctor_id, clinic_id) = match (query.date, query.doctor_id, query.clinic_id) {
            (Some(date), Some(doctor_id), Some(clinic_id)) => (date, doctor_id, clinic_id),
            _ => {
                debug!("Slot query missing date, doctor or clinic - nothing to offer");
                return Ok(vec![]);
            }
        };

        debug!("Computing slots for doctor {} at clinic {} on {}", doctor_id, clinic_id, date);

        let (closed, sessions, booked, service_minutes) = tokio::try_join!(
            self.exception_service.is_closed(clinic_id, doctor_id, date),
            self.schedule_service.sessions_for_date(doctor_id, clinic_id, date),
            self.booking_service.booked_for_date(doctor_id, clinic_id, date, query.exclude_appointment_id),
            self.duration_service.total_duration(&query.service_ids, doctor_id, clinic_id),
        )?;

        if closed {
            debug!("Doctor {} is closed on {} - no slots", doctor_id, date);
            return Ok(vec![]);
        }

        let mut results = Vec::with_capacity(sessions.len());

        for (session_index, session) in sessions.into_iter().enumerate() {
            // Requested services override the session's native granularity.
            let step_minutes = if service_minutes > 0 {
                service_minutes
            } else {
                session.granularity_minutes
            };

            let mut slots = Vec::new();
            for chunk in free_chunks(session.primary, &booked) {
                slots.extend(quantize_chunk(chunk, step_minutes, date, now, query.available_only));
            }

            results.push(SessionSlots { session_index, session, slots });
        }

        debug!("Computed {} session groups for doctor {} on {}", results.len(), doctor_id, date);
        Ok(results)
    }
}
