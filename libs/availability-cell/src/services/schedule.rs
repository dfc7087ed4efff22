use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{AvailabilityError, DayOfWeek, SessionBlock, TimeRange, WorkingSession};

pub struct ScheduleService {
    supabase: Arc<SupabaseClient>,
}

impl ScheduleService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Fetch the weekly working sessions for a doctor at a clinic and resolve
    /// the ones applying to the given date. Weekday filtering happens here
    /// rather than in the query because stored day encodings are mixed.
    pub async fn sessions_for_date(
        &self,
        doctor_id: Uuid,
        clinic_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<SessionBlock>, AvailabilityError> {
        debug!("Fetching working sessions for doctor {} at clinic {} on {}",
               doctor_id, clinic_id, date);

        let path = format!(
            "/rest/v1/working_sessions?doctor_id=eq.{}&clinic_id=eq.{}&order=start_time.asc",
            doctor_id, clinic_id
        );

        let rows: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
            None,
        ).await.map_err(|e| AvailabilityError::Database(e.to_string()))?;

        let sessions: Vec<WorkingSession> = rows.into_iter()
            .filter_map(|row| match serde_json::from_value::<WorkingSession>(row) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Skipping malformed working session row: {}", e);
                    None
                }
            })
            .collect();

        Ok(resolve_session_blocks(sessions, date.weekday().into()))
    }
}

/// Collapses session rows for one weekday into ordered blocks. Parents carry
/// the bookable range; the first child of a parent becomes its secondary
/// display range. Rows with an empty time range and children without a
/// surviving parent are dropped.
pub fn resolve_session_blocks(sessions: Vec<WorkingSession>, weekday: DayOfWeek) -> Vec<SessionBlock> {
    let mut parents: Vec<WorkingSession> = Vec::new();
    let mut children: Vec<WorkingSession> = Vec::new();

    for session in sessions {
        if session.day_of_week != weekday {
            continue;
        }
        if session.start_time == session.end_time {
            continue;
        }
        if session.parent_session_id.is_some() {
            children.push(session);
        } else {
            parents.push(session);
        }
    }

    parents.sort_by_key(|session| session.start_time);
    children.sort_by_key(|session| session.start_time);

    parents.into_iter()
        .map(|parent| {
            let secondary = children.iter()
                .find(|child| child.parent_session_id == Some(parent.id))
                .map(|child| TimeRange::new(child.start_time, child.end_time));

            SessionBlock {
                id: parent.id,
                primary: TimeRange::new(parent.start_time, parent.end_time),
                secondary,
                granularity_minutes: parent.slot_granularity_minutes,
            }
        })
        .collect()
}
