use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    account::settings::SettingName,
    models::{Address, AddressType, Settings, UserProfile},
};

/// Editable profile fields. Also the body of a profile save.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct ProfileForm {
    pub full_name: String,
    pub phone: String,
    pub street_address: String,
    pub landmark: String,
    pub area: String,
    pub city: String,
    pub pincode: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileView {
    /// `None` until the user saves a profile for the first time.
    pub profile: Option<UserProfile>,
    pub form: ProfileForm,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddressRequest {
    #[serde(rename = "type", default)]
    pub address_type: AddressType,
    pub label: Option<String>,
    pub street_address: String,
    pub landmark: Option<String>,
    pub area: String,
    pub city: Option<String>,
    pub pincode: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct DeleteAddressQuery {
    pub confirm: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct AddressList {
    #[schema(value_type = Vec<Address>)]
    pub items: Vec<Address>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleSettingRequest {
    pub setting: SettingName,
    pub enabled: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountExport {
    pub exported_at: DateTime<Utc>,
    pub email: String,
    pub profile: Option<UserProfile>,
    pub addresses: Vec<Address>,
    pub settings: Settings,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteAccountRequest {
    pub confirmation: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletionNotice {
    pub requested_at: DateTime<Utc>,
    pub deleted: bool,
}
