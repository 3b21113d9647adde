// Domain errors
pub mod errors;

// Clinical features, records and prediction outcomes
pub mod ml;

// Browser session state
pub mod session;
