//! Analysis request - everything the user submits for one analysis.

use super::ad_input::{require_http_url, AdInput};
use crate::domain::foundation::ValidationError;

/// Upload limit enforced by the analysis service (10 MiB).
pub const DEFAULT_MAX_AD_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// A multi-field analysis request.
///
/// Optional fields that are blank after trimming are stored as `None`,
/// so they are never sent as empty form parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// The ad creative.
    pub ad_input: AdInput,
    /// Landing page the ad points to (required).
    pub landing_page_url: String,
    /// Target audience description.
    pub target_audience: Option<String>,
    /// Campaign goal description.
    pub campaign_goal: Option<String>,
    /// Brand guidelines, usually JSON text. Passed through unvalidated.
    pub guidelines: Option<String>,
}

impl AnalysisRequest {
    /// Creates a request with the two required fields.
    pub fn new(ad_input: AdInput, landing_page_url: impl Into<String>) -> Self {
        Self {
            ad_input,
            landing_page_url: landing_page_url.into().trim().to_string(),
            target_audience: None,
            campaign_goal: None,
            guidelines: None,
        }
    }

    /// Sets the target audience.
    pub fn with_target_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = non_blank(audience.into());
        self
    }

    /// Sets the campaign goal.
    pub fn with_campaign_goal(mut self, goal: impl Into<String>) -> Self {
        self.campaign_goal = non_blank(goal.into());
        self
    }

    /// Sets the brand guidelines.
    pub fn with_guidelines(mut self, guidelines: impl Into<String>) -> Self {
        self.guidelines = non_blank(guidelines.into());
        self
    }

    /// Validates required fields and the ad against the upload limit.
    ///
    /// Runs before any state transition or network call.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the landing page URL is missing
    /// - `InvalidFormat` if a URL is not http(s) or the ad file is not an image
    /// - `TooLarge` if the ad file exceeds `max_ad_file_bytes`
    pub fn validate(&self, max_ad_file_bytes: u64) -> Result<(), ValidationError> {
        if self.landing_page_url.is_empty() {
            return Err(ValidationError::empty_field("landing_page_url"));
        }
        require_http_url("landing_page_url", &self.landing_page_url)?;
        self.ad_input.validate(max_ad_file_bytes)
    }

    /// Renders the user-facing message that opens the conversation turn.
    pub fn summary(&self) -> String {
        let mut content = match &self.ad_input {
            AdInput::File { filename, .. } => format!("📤 Ad file: {}", filename),
            AdInput::Url { url } => format!("📎 Ad URL: {}", url),
        };
        content.push_str(&format!("\n📄 Landing page: {}", self.landing_page_url));

        if let Some(audience) = &self.target_audience {
            content.push_str(&format!("\n🎯 Target audience: {}", audience));
        }
        if let Some(goal) = &self.campaign_goal {
            content.push_str(&format!("\n🎁 Campaign goal: {}", goal));
        }
        if self.guidelines.is_some() {
            content.push_str("\n📋 Brand guidelines: yes");
        }
        content
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_request() -> AnalysisRequest {
        AnalysisRequest::new(AdInput::file(vec![1, 2, 3], "ad.jpg"), "https://example.com/lp")
    }

    mod builder {
        use super::*;

        #[test]
        fn blank_optionals_are_dropped() {
            let request = file_request()
                .with_target_audience("   ")
                .with_campaign_goal("")
                .with_guidelines("\n");

            assert_eq!(request.target_audience, None);
            assert_eq!(request.campaign_goal, None);
            assert_eq!(request.guidelines, None);
        }

        #[test]
        fn present_optionals_are_kept() {
            let request = file_request()
                .with_target_audience("B2B decision makers")
                .with_campaign_goal("Lead generation")
                .with_guidelines(r#"{"tone_of_voice":["professional"]}"#);

            assert_eq!(request.target_audience.as_deref(), Some("B2B decision makers"));
            assert_eq!(request.campaign_goal.as_deref(), Some("Lead generation"));
            assert!(request.guidelines.is_some());
        }

        #[test]
        fn landing_page_is_trimmed() {
            let request = AnalysisRequest::new(AdInput::url("https://a.test/x.png"), "  https://b.test  ");
            assert_eq!(request.landing_page_url, "https://b.test");
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn valid_request_passes() {
            assert!(file_request().validate(DEFAULT_MAX_AD_FILE_BYTES).is_ok());
        }

        #[test]
        fn empty_landing_page_fails() {
            let request = AnalysisRequest::new(AdInput::file(vec![1], "ad.jpg"), "  ");
            assert_eq!(
                request.validate(DEFAULT_MAX_AD_FILE_BYTES),
                Err(ValidationError::empty_field("landing_page_url"))
            );
        }

        #[test]
        fn non_http_landing_page_fails() {
            let request = AnalysisRequest::new(AdInput::file(vec![1], "ad.jpg"), "example.com/lp");
            let err = request.validate(DEFAULT_MAX_AD_FILE_BYTES).unwrap_err();
            assert_eq!(err.field(), "landing_page_url");
        }

        #[test]
        fn invalid_ad_fails() {
            let request = AnalysisRequest::new(AdInput::file(vec![1], "ad.exe"), "https://example.com");
            let err = request.validate(DEFAULT_MAX_AD_FILE_BYTES).unwrap_err();
            assert_eq!(err.field(), "ad_file");
        }
    }

    mod summary {
        use super::*;

        #[test]
        fn file_summary_names_file_and_landing_page() {
            let summary = file_request().summary();
            assert_eq!(summary, "📤 Ad file: ad.jpg\n📄 Landing page: https://example.com/lp");
        }

        #[test]
        fn url_summary_lists_all_present_fields() {
            let summary = AnalysisRequest::new(AdInput::url("https://cdn.test/a.png"), "https://lp.test")
                .with_target_audience("Students")
                .with_campaign_goal("Awareness")
                .with_guidelines("{}")
                .summary();

            assert_eq!(
                summary,
                "📎 Ad URL: https://cdn.test/a.png\n📄 Landing page: https://lp.test\n🎯 Target audience: Students\n🎁 Campaign goal: Awareness\n📋 Brand guidelines: yes"
            );
        }
    }
}
