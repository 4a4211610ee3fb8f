use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub users_collection: String,

    pub print_example: bool,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "edulift".to_string());

    let users_collection = env::var("USERS_COLLECTION")
        .unwrap_or_else(|_| "users".to_string());

    let print_example = env::var("PRINT_EXAMPLE")
        .map(|v| parse_flag(&v))
        .unwrap_or(true);

    Settings {
        mongodb_uri,
        mongodb_db,
        users_collection,
        print_example,
    }
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}
