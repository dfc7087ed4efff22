use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::SlotQuery;
use crate::services::availability::AvailabilityService;

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    pub date: Option<NaiveDate>,
    pub doctor_id: Option<Uuid>,
    pub clinic_id: Option<Uuid>,
    /// Comma-separated service ids.
    pub service_ids: Option<String>,
    pub exclude_appointment_id: Option<Uuid>,
    pub available_only: Option<bool>,
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let service_ids = parse_service_ids(query.service_ids.as_deref())?;

    let slot_query = SlotQuery {
        date: query.date,
        doctor_id: query.doctor_id,
        clinic_id: query.clinic_id,
        service_ids,
        exclude_appointment_id: query.exclude_appointment_id,
        available_only: query.available_only.unwrap_or(false),
    };

    let availability_service = AvailabilityService::new(&state);

    let sessions = availability_service.compute_slots(&slot_query).await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let total_slots: usize = sessions.iter().map(|group| group.slots.len()).sum();

    Ok(Json(json!({
        "date": query.date,
        "doctor_id": query.doctor_id,
        "clinic_id": query.clinic_id,
        "sessions": sessions,
        "total_slots": total_slots
    })))
}

fn parse_service_ids(raw: Option<&str>) -> Result<Vec<Uuid>, AppError> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(vec![]),
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            Uuid::parse_str(part)
                .map_err(|_| AppError::BadRequest(format!("Invalid service id: {}", part)))
        })
        .collect()
}
