pub mod user;
pub mod vocab;

pub use user::{ConsentFlags, Preferences, Profile, User};
pub use vocab::{Language, RiskFlag, Role, UnknownTerm};
