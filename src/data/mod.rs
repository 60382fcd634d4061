mod loader;

pub use loader::{LoadError, load_questions_from_json, validate_questions};
