use chrono::Utc;
use mongodb::bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

use super::vocab::{Language, RiskFlag, Role};

/// A stored user record. Optional fields are left out of the document rather
/// than written as null, which the collection validator would reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub roles: Vec<Role>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_home_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_flags: Option<ConsentFlags>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risk_flags: Vec<RiskFlag>,

    pub email: String,

    // legacy fields, kept alongside `profile` without any cross-check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    pub created_at: DateTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<Document>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_processing_consent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_consent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_consent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_video_consent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_timestamp: Option<DateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_preferences: Option<Document>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: Some(Language::English),
            timezone: Some("UTC".to_string()),
            email_notifications: Some(true),
            sms_notifications: Some(false),
            push_notifications: Some(true),
            custom_preferences: None,
        }
    }
}

impl User {
    /// Record with the required fields and default preferences.
    /// `createdAt` and `updatedAt` are both now.
    pub fn new(roles: Vec<Role>, email: impl Into<String>) -> Self {
        let now = DateTime::from_chrono(Utc::now());
        Self {
            id: None,
            roles,
            group_home_id: None,
            profile: None,
            consent_flags: None,
            preferences: Some(Preferences::default()),
            risk_flags: Vec::new(),
            email: email.into(),
            username: None,
            first_name: None,
            last_name: None,
            created_at: now,
            updated_at: Some(now),
        }
    }

    /// The sample document printed after setup.
    pub fn example() -> Self {
        let now = DateTime::from_chrono(Utc::now());

        let mut user = Self::new(vec![Role::Student], "jane.doe@example.com");
        user.group_home_id = Some("gh_001".to_string());
        user.profile = Some(Profile {
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            phone_number: Some("+1234567890".to_string()),
            ..Profile::default()
        });
        user.consent_flags = Some(ConsentFlags {
            data_processing_consent: Some(true),
            communication_consent: Some(true),
            consent_timestamp: Some(now),
            ..ConsentFlags::default()
        });
        user.risk_flags = vec![RiskFlag::Academic];
        user.created_at = now;
        user.updated_at = None;
        user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, Bson};

    #[test]
    fn new_record_sets_timestamps_and_default_preferences() {
        let user = User::new(vec![Role::Mentor], "m@example.com");
        assert_eq!(user.updated_at, Some(user.created_at));
        assert_eq!(user.preferences, Some(Preferences::default()));

        let doc = bson::to_document(&user).unwrap();
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["roles", "preferences", "email", "createdAt", "updatedAt"]);
        assert!(matches!(doc.get("createdAt"), Some(Bson::DateTime(_))));
        assert!(matches!(doc.get("updatedAt"), Some(Bson::DateTime(_))));

        let prefs = doc.get_document("preferences").unwrap();
        assert_eq!(prefs.get_str("language").unwrap(), "en");
        assert_eq!(prefs.get_str("timezone").unwrap(), "UTC");
        assert!(prefs.get_bool("emailNotifications").unwrap());
        assert!(!prefs.get_bool("smsNotifications").unwrap());
        assert!(prefs.get_bool("pushNotifications").unwrap());
        assert!(!prefs.contains_key("customPreferences"));
    }

    #[test]
    fn nested_fields_use_camel_case() {
        let doc = bson::to_document(&User::example()).unwrap();

        let profile = doc.get_document("profile").unwrap();
        assert_eq!(profile.get_str("firstName").unwrap(), "Jane");
        assert_eq!(profile.get_str("phoneNumber").unwrap(), "+1234567890");

        let consent = doc.get_document("consentFlags").unwrap();
        assert!(consent.get_bool("dataProcessingConsent").unwrap());
        assert!(matches!(consent.get("consentTimestamp"), Some(Bson::DateTime(_))));

        let prefs = doc.get_document("preferences").unwrap();
        assert_eq!(prefs.get_str("language").unwrap(), "en");
        assert!(!prefs.get_bool("smsNotifications").unwrap());

        assert_eq!(doc.get_str("groupHomeId").unwrap(), "gh_001");
        assert_eq!(
            doc.get_array("riskFlags").unwrap(),
            &vec![Bson::String("academic_risk".into())]
        );
    }

    #[test]
    fn reads_back_stored_record() {
        let user = User::example();
        let doc = bson::to_document(&user).unwrap();
        let back: User = bson::from_document(doc).unwrap();
        assert_eq!(back, user);
    }
}
