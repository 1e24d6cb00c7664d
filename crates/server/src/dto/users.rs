//! # User Data Transfer Objects

use entity::users;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Response for a user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id:           Uuid,
    pub email:        String,
    pub display_name: String,
    pub role:         String,
    pub is_active:    bool,
    pub avatar_url:   Option<String>,
    pub postal_code:  Option<String>,
    pub street:       Option<String>,
    pub city:         Option<String>,
    pub region:       Option<String>,
    pub created_at:   String,
    pub updated_at:   String,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id:           user.id,
            email:        user.email,
            display_name: user.display_name,
            role:         user.role.to_string(),
            is_active:    user.is_active,
            avatar_url:   user.avatar_url,
            postal_code:  user.postal_code,
            street:       user.street,
            city:         user.city,
            region:       user.region,
            created_at:   user.created_at.to_rfc3339(),
            updated_at:   user.updated_at.to_rfc3339(),
        }
    }
}

/// Request to create a new user
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email:        String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Display name must be between 1 and 255 characters"
    ))]
    pub display_name: String,
}

/// Request to update a user profile
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Display name must be between 1 and 255 characters"
    ))]
    pub display_name: Option<String>,
    #[validate(url(message = "Invalid avatar URL"))]
    pub avatar_url:   Option<String>,
    #[validate(length(max = 16, message = "Postal code must not exceed 16 characters"))]
    pub postal_code:  Option<String>,
    pub street:       Option<String>,
    pub city:         Option<String>,
    pub region:       Option<String>,
}

/// Response for a user list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users:   Vec<UserResponse>,
}

/// Query parameters for the user list
#[derive(Debug, Clone, Deserialize)]
pub struct UserListQuery {
    pub page:     Option<u64>,
    pub per_page: Option<u64>,
}

impl UserListQuery {
    /// Page number (1-based, default 1)
    #[must_use]
    pub fn page(&self) -> u64 { self.page.unwrap_or(1).max(1) }

    /// Items per page (default 20, max 100)
    #[must_use]
    pub fn per_page(&self) -> u64 { self.per_page.unwrap_or(20).clamp(1, 100) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_request_validation() {
        let valid = CreateUserRequest {
            email:        "volunteer@example.com".to_string(),
            display_name: "Pat".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = CreateUserRequest {
            email:        "not-an-email".to_string(),
            display_name: "Pat".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let empty_name = CreateUserRequest {
            email:        "volunteer@example.com".to_string(),
            display_name: String::new(),
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_list_query_defaults() {
        let query = UserListQuery {
            page:     None,
            per_page: Some(500),
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.per_page(), 100);
    }
}
