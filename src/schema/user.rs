use super::{CollectionSpec, FieldRule, ObjectRule, UnknownFields, ValidationPolicy};
use crate::models::{Language, RiskFlag, Role};

/// Validation rule for user records.
///
/// Open at every level: fields not listed here are stored as-is.
/// `additionalInfo` and `customPreferences` accept any object.
pub fn user_schema() -> ObjectRule {
    let profile = ObjectRule::new()
        .optional("firstName", FieldRule::string().max_len(50))
        .optional("lastName", FieldRule::string().max_len(50))
        .optional("phoneNumber", FieldRule::string())
        .optional("dateOfBirth", FieldRule::string())
        .optional("address", FieldRule::string().max_len(200))
        .optional("emergencyContact", FieldRule::string().max_len(100))
        .optional("emergencyPhoneNumber", FieldRule::string())
        .optional("additionalInfo", FieldRule::any_object());

    let consent = ObjectRule::new()
        .optional("dataProcessingConsent", FieldRule::boolean())
        .optional("communicationConsent", FieldRule::boolean())
        .optional("emergencyContactConsent", FieldRule::boolean())
        .optional("photoVideoConsent", FieldRule::boolean())
        .optional("consentTimestamp", FieldRule::date());

    let preferences = ObjectRule::new()
        .optional("language", FieldRule::one_of(Language::terms()))
        .optional("timezone", FieldRule::string().max_len(50))
        .optional("emailNotifications", FieldRule::boolean())
        .optional("smsNotifications", FieldRule::boolean())
        .optional("pushNotifications", FieldRule::boolean())
        .optional("customPreferences", FieldRule::any_object());

    ObjectRule::new()
        .titled("User Schema Validation")
        .optional(
            "_id",
            FieldRule::new(super::BsonKind::ObjectId).describe("Unique identifier for the user"),
        )
        .required(
            "roles",
            FieldRule::array_of(FieldRule::one_of(Role::terms()))
                .describe("User roles - required field")
                .non_empty()
                .unique(),
        )
        .optional(
            "groupHomeId",
            FieldRule::string()
                .describe("Group home identifier - indexed field")
                .length(Some(1), Some(100)),
        )
        .optional(
            "profile",
            FieldRule::object(profile).describe("User profile information"),
        )
        .optional(
            "consentFlags",
            FieldRule::object(consent).describe("User consent information"),
        )
        .optional(
            "preferences",
            FieldRule::object(preferences).describe("User preferences"),
        )
        .optional(
            "riskFlags",
            FieldRule::array_of(FieldRule::one_of(RiskFlag::terms()))
                .describe("Array of risk indicators"),
        )
        .required(
            "email",
            FieldRule::string()
                .describe("User email - unique indexed field")
                .max_len(255),
        )
        .required(
            "createdAt",
            FieldRule::date().describe("User creation timestamp - required field"),
        )
        .optional(
            "username",
            FieldRule::string().describe("Legacy field - username").max_len(50),
        )
        .optional(
            "firstName",
            FieldRule::string().describe("Legacy field - first name").max_len(50),
        )
        .optional(
            "lastName",
            FieldRule::string().describe("Legacy field - last name").max_len(50),
        )
        .optional(
            "updatedAt",
            FieldRule::date().describe("Last update timestamp"),
        )
        .unknown_fields(UnknownFields::Allow)
}

pub fn user_collection(name: impl Into<String>) -> CollectionSpec {
    CollectionSpec {
        name: name.into(),
        rule: user_schema(),
        policy: ValidationPolicy::STRICT_ERROR,
    }
}
