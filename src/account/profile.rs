use crate::{
    dto::account::ProfileForm,
    error::{AppError, AppResult},
    models::UserProfile,
};

pub const DEFAULT_CITY: &str = "Bangalore";
pub const PINCODE_LEN: usize = 6;

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            phone: String::new(),
            street_address: String::new(),
            landmark: String::new(),
            area: String::new(),
            city: DEFAULT_CITY.to_string(),
            pincode: String::new(),
        }
    }
}

impl From<&UserProfile> for ProfileForm {
    fn from(profile: &UserProfile) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            full_name: text(&profile.full_name),
            phone: text(&profile.phone),
            street_address: text(&profile.street_address),
            landmark: text(&profile.landmark),
            area: text(&profile.area),
            city: profile
                .city
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CITY.to_string()),
            pincode: text(&profile.pincode),
        }
    }
}

/// An empty pincode is allowed; anything else must be exactly six digits.
pub fn validate_pincode(pincode: &str) -> AppResult<()> {
    if pincode.is_empty() {
        return Ok(());
    }
    if pincode.len() != PINCODE_LEN || !pincode.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::BadRequest("Pincode must be 6 digits".into()));
    }
    Ok(())
}

/// Empty form fields are stored as NULL.
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn missing_profile_form_defaults_to_bangalore() {
        let form = ProfileForm::default();
        assert_eq!(form.city, "Bangalore");
        assert!(form.full_name.is_empty());
        assert!(form.pincode.is_empty());
    }

    #[test]
    fn form_mirrors_stored_profile() {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            full_name: Some("Asha Rao".into()),
            phone: None,
            street_address: Some("4th Cross".into()),
            landmark: None,
            area: Some("Jayanagar".into()),
            city: None,
            pincode: Some("560041".into()),
            updated_at: Utc::now(),
        };
        let form = ProfileForm::from(&profile);
        assert_eq!(form.full_name, "Asha Rao");
        assert_eq!(form.phone, "");
        assert_eq!(form.city, "Bangalore");
        assert_eq!(form.pincode, "560041");
    }

    #[test]
    fn pincode_pattern() {
        assert!(validate_pincode("").is_ok());
        assert!(validate_pincode("560001").is_ok());
        assert!(validate_pincode("56001").is_err());
        assert!(validate_pincode("5600a1").is_err());
        assert!(validate_pincode("5600011").is_err());
    }

    #[test]
    fn blank_fields_become_null() {
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty(" Koramangala "), Some("Koramangala".into()));
    }
}
