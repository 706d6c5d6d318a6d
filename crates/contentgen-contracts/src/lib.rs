//! Data contracts shared by the content generation engine and its front ends.

pub mod content_type;
pub mod events;
pub mod request;
pub mod response;
pub mod session;

pub use content_type::ContentType;
pub use request::{FieldError, GenerationRequest, ImageOptions, RawForm, ValidationErrors};
pub use response::{
    error_detail, ContentPayload, GenerationResponse, NormalizedResult, GENERIC_FAILURE_MESSAGE,
};
pub use session::{FormSession, SessionError, SubmissionState};
