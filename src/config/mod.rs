mod types;

pub use types::{AuthConfig, RetryPolicy};
