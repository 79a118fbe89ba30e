//! Result type alias for the service configuration crate

use super::errors::ServiceConfigError;

/// Result type alias for section resolution
///
/// # Examples
///
/// ```
/// use service_config::domain::result::Result;
/// use service_config::domain::errors::ServiceConfigError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ServiceConfigError::missing("database.host"))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ServiceConfigError>;
