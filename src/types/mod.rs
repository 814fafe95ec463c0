pub mod analysis;
pub mod error;

pub use analysis::{
    CanonicalAnalysis, ClassInfo, EndpointInfo, FunctionInfo, HttpMethod, MethodInfo, Summary,
    return_description,
};
pub use error::{ErrorCategory, ErrorClassifier, LlmError, Result, WeaveError};
