//! Multipart request body for the streaming analysis endpoint.
//!
//! The body is described as an ordered list of named parts so it can be
//! inspected in tests and converted to a transport-specific form by the
//! HTTP adapter.

use bytes::Bytes;

use super::{AdInput, AnalysisRequest};
use crate::domain::foundation::ValidationError;

/// Form field names understood by the analysis service.
pub mod fields {
    pub const AD_FILE: &str = "ad_file";
    pub const AD_URL: &str = "ad_url";
    pub const LANDING_PAGE_URL: &str = "landing_page_url";
    pub const TARGET_AUDIENCE: &str = "target_audience";
    pub const CAMPAIGN_GOAL: &str = "campaign_goal";
    pub const BRAND_GUIDELINES: &str = "brand_guidelines";
}

/// Value of a single form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File {
        bytes: Bytes,
        filename: String,
        mime_type: String,
    },
}

/// A named form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: &'static str,
    pub value: PartValue,
}

impl FormPart {
    fn text(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: PartValue::Text(value.into()),
        }
    }
}

/// The complete multipart body for one analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    parts: Vec<FormPart>,
}

impl MultipartBody {
    /// Builds the body from a request.
    ///
    /// `ad_file` and `ad_url` are mutually exclusive by construction; optional
    /// fields appear only when present. No side effects.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the landing page URL is empty. Callers are expected
    ///   to have run [`AnalysisRequest::validate`] already.
    pub fn build(request: &AnalysisRequest) -> Result<Self, ValidationError> {
        if request.landing_page_url.trim().is_empty() {
            return Err(ValidationError::empty_field(fields::LANDING_PAGE_URL));
        }

        let mut parts = vec![FormPart::text(
            fields::LANDING_PAGE_URL,
            &request.landing_page_url,
        )];

        parts.push(match &request.ad_input {
            AdInput::File {
                bytes,
                filename,
                mime_type,
            } => FormPart {
                name: fields::AD_FILE,
                value: PartValue::File {
                    bytes: bytes.clone(),
                    filename: filename.clone(),
                    mime_type: mime_type.clone(),
                },
            },
            AdInput::Url { url } => FormPart::text(fields::AD_URL, url),
        });

        let optionals = [
            (fields::TARGET_AUDIENCE, &request.target_audience),
            (fields::CAMPAIGN_GOAL, &request.campaign_goal),
            (fields::BRAND_GUIDELINES, &request.guidelines),
        ];
        for (name, value) in optionals {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                parts.push(FormPart::text(name, value));
            }
        }

        Ok(Self { parts })
    }

    /// Returns the parts in submission order.
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Consumes the body, returning its parts.
    pub fn into_parts(self) -> Vec<FormPart> {
        self.parts
    }

    /// Names of all parts in submission order.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.parts.iter().map(|p| p.name).collect()
    }

    /// Returns the value of a text part by name.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find(|p| p.name == name).and_then(|p| match &p.value {
            PartValue::Text(text) => Some(text.as_str()),
            PartValue::File { .. } => None,
        })
    }

    /// Returns true if a part with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }
}
