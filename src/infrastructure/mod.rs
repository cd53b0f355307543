pub mod core;
pub mod frankfurter;
pub mod gemini;
pub mod mock;
pub mod settings_persistence;

pub use frankfurter::FrankfurterRateSource;
pub use gemini::GeminiAnalyzer;
pub use mock::{MockAnalyzer, MockRateSource};
pub use settings_persistence::{InMemoryPreferenceStore, JsonPreferenceStore};
