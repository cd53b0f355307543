// Rate series domain
pub mod rates;

// Current-rate derivation and analysis inputs
pub mod signal;

// Notification preferences
pub mod preferences;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
