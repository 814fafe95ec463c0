//! Timeout Helper
//!
//! Every enhancement request made while rendering is bounded:
//!
//! ```ignore
//! use crate::ai::timeout::with_timeout;
//!
//! let text = with_timeout(
//!     Duration::from_secs(60),
//!     enhancer.enhance(context, ElementKind::Function),
//!     "enhance function",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{Result, WeaveError};

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(WeaveError::timeout(operation_name, timeout)),
    }
}
