// Periodic series acquisition
pub mod refresh;

// Advantage score and narrative state
pub mod analysis;

// Notification preferences
pub mod preferences;

// Application wiring
pub mod system;
