//! Shared building blocks for HTTP handlers

pub mod call_policy;
pub mod response;
pub mod validated_json;

pub use call_policy::CallPolicy;
pub use response::{
    http_status, ApiError, ApiResult, OcpiResponse, STATUS_CORE_ERROR, STATUS_MALFORMED,
    STATUS_SUCCESS,
};
pub use validated_json::ValidatedJson;
