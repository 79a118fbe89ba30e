//! Domain types shared by every section.
//!
//! All fallible operations return [`Result<T, ServiceConfigError>`]:
//!
//! ```rust
//! use service_config::domain::{Result, ServiceConfigError};
//!
//! fn require(value: Option<&str>) -> Result<&str> {
//!     value.ok_or_else(|| ServiceConfigError::missing("database.host"))
//! }
//! ```

pub mod errors;
pub mod result;

pub use errors::ServiceConfigError;
pub use result::Result;
