//! Analysis module - the request, its wire encoding and the streamed reply.
//!
//! - [`AdInput`] / [`AnalysisRequest`] describe what the user submits
//! - [`MultipartBody`] is the request body sent to the service
//! - [`LineDecoder`] / [`decode_lines`] turn the response body into lines
//! - [`ServerEvent`] classifies each line
//! - [`AnalysisError`] is the session failure taxonomy

mod ad_input;
mod errors;
mod line_decoder;
mod multipart;
mod request;
mod server_event;

pub use ad_input::{image_mime_type, AdInput};
pub use errors::{AnalysisError, AnalysisErrorKind, FAILURE_PREFIX};
pub use line_decoder::{decode_lines, ByteStream, LineDecoder, LineStream};
pub use multipart::{fields, FormPart, MultipartBody, PartValue};
pub use request::{AnalysisRequest, DEFAULT_MAX_AD_FILE_BYTES};
pub use server_event::{ServerEvent, EVENT_FRAME_PREFIX};
