//! Travel-request domain models.
//!
//! `TravelForm` mirrors the backend submission schema. Client-side
//! validation runs before anything touches the network; the server
//! revalidates anyway.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client-side form rejection. Never reaches the network layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("At least one passion is required")]
    NoPassions,

    #[error("At least one adult traveler is required")]
    NoAdults,

    #[error("At least one room is required")]
    NoRooms,

    #[error("A valid contact email is required")]
    BadEmail,

    #[error("Check-out date must not precede check-in date")]
    DatesReversed,
}

/// Trip-preference payload for `POST /travel/submit-form`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelForm {
    pub passions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_places: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub places_to_visit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_destinations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_pace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accommodation_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accommodation_type: Option<String>,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
    pub rooms: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traveler_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transportation_known: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_departure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_services: Option<String>,
    pub email: String,
}

impl TravelForm {
    /// Check the constraints the backend enforces on submission.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.passions.is_empty() {
            return Err(ValidationError::NoPassions);
        }
        if self.adults < 1 {
            return Err(ValidationError::NoAdults);
        }
        if self.rooms < 1 {
            return Err(ValidationError::NoRooms);
        }
        if !self.email.contains('@') || self.email.trim().len() < 3 {
            return Err(ValidationError::BadEmail);
        }
        if let (Some(check_in), Some(check_out)) = (self.check_in, self.check_out) {
            if check_out < check_in {
                return Err(ValidationError::DatesReversed);
            }
        }
        Ok(())
    }
}

/// Response from `POST /travel/submit-form`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitFormResponse {
    pub travel_id: String,
    #[serde(default)]
    pub external_job_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub next_steps: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Summary entry from `GET /travel/my-travels`.
#[derive(Debug, Clone, Deserialize)]
pub struct TravelSummary {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub passions: Vec<String>,
    #[serde(default)]
    pub budget: Option<String>,
}

/// Destination entry from the public destinations endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Destination {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
}
