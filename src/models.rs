use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub street_address: Option<String>,
    pub landmark: Option<String>,
    pub area: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    #[default]
    Home,
    Work,
    Other,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Home => "home",
            AddressType::Work => "work",
            AddressType::Other => "other",
        }
    }

    /// Label used when the caller does not name the address.
    pub fn default_label(&self) -> &'static str {
        match self {
            AddressType::Home => "Home",
            AddressType::Work => "Work",
            AddressType::Other => "Other",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown address type: {0}")]
pub struct UnknownAddressType(pub String);

impl TryFrom<String> for AddressType {
    type Error = UnknownAddressType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "home" => Ok(AddressType::Home),
            "work" => Ok(AddressType::Work),
            "other" => Ok(AddressType::Other),
            _ => Err(UnknownAddressType(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub address_type: AddressType,
    pub label: String,
    pub street_address: String,
    pub landmark: Option<String>,
    pub area: String,
    pub city: String,
    pub pincode: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Notification preferences stored under a per-user key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Settings {
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub marketing_communications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            sms_notifications: true,
            marketing_communications: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductFlavor {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub price_delta: i64,
    pub is_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub subcategory_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub flavors: Vec<ProductFlavor>,
}
