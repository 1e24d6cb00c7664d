//! # Event and Registration Data Transfer Objects

use chrono::NaiveDate;
use entity::{event_registrations, events};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Response for an event, with its current deduplicated occupancy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventResponse {
    pub id:             Uuid,
    pub title:          String,
    pub description:    Option<String>,
    pub event_date:     NaiveDate,
    pub status:         String,
    pub max_volunteers: i32,
    pub occupancy:      u64,
    pub created_by:     Uuid,
    pub created_at:     String,
    pub updated_at:     String,
}

impl EventResponse {
    #[must_use]
    pub fn from_model(event: events::Model, occupancy: u64) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            event_date: event.event_date,
            status: event.status.to_string(),
            max_volunteers: event.max_volunteers,
            occupancy,
            created_by: event.created_by,
            created_at: event.created_at.to_rfc3339(),
            updated_at: event.updated_at.to_rfc3339(),
        }
    }
}

/// Request to create an event
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title:          String,
    pub description:    Option<String>,
    pub event_date:     NaiveDate,
    #[validate(range(min = 1, message = "max_volunteers must be at least 1"))]
    pub max_volunteers: i32,
}

/// Request to update an event
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title:          Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description:    Option<Option<String>>,
    pub event_date:     Option<NaiveDate>,
    #[validate(range(min = 1, message = "max_volunteers must be at least 1"))]
    pub max_volunteers: Option<i32>,
}

/// Request to advance an event along its status graph
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdvanceEventRequest {
    pub status: entity::events::EventStatus,
}

/// Response for an event list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventListResponse {
    pub success: bool,
    pub events:  Vec<EventResponse>,
}

/// Response for a registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationResponse {
    pub id:         Uuid,
    pub event_id:   Uuid,
    pub user_id:    Uuid,
    pub status:     String,
    pub created_at: String,
}

impl From<event_registrations::Model> for RegistrationResponse {
    fn from(row: event_registrations::Model) -> Self {
        Self {
            id:         row.id,
            event_id:   row.event_id,
            user_id:    row.user_id,
            status:     row.status.to_string(),
            created_at: row.created_at.to_rfc3339(),
        }
    }
}

/// Response for an event's registration list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationListResponse {
    pub success:       bool,
    pub registrations: Vec<RegistrationResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_event_request_validation() {
        let valid = CreateEventRequest {
            title:          "Park cleanup".to_string(),
            description:    None,
            event_date:     NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
            max_volunteers: 20,
        };
        assert!(valid.validate().is_ok());

        let zero_capacity = CreateEventRequest {
            max_volunteers: 0,
            ..valid.clone()
        };
        assert!(zero_capacity.validate().is_err());

        let blank_title = CreateEventRequest {
            title: String::new(),
            ..valid
        };
        assert!(blank_title.validate().is_err());
    }

    #[test]
    fn test_update_request_null_clears_description() {
        // An explicit null clears the field; leaving it out leaves it alone.
        let cleared: UpdateEventRequest = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let replaced: UpdateEventRequest = serde_json::from_str(r#"{"description": "New text"}"#).unwrap();
        assert_eq!(replaced.description, Some(Some("New text".to_string())));

        let untouched: UpdateEventRequest = serde_json::from_str(r#"{"title": "Renamed"}"#).unwrap();
        assert_eq!(untouched.description, None);
    }
}
