//! Error message formatting with actionable suggestions.
//!
//! Registry errors are shown with their code, the URL they came from, the
//! server's request id when one was reported, and the suggestion for their
//! kind.

use x07_core::error::ApiError;

use super::colors::ColorSupport;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self::with_colors(ColorSupport::detect())
    }

    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Format a registry error with context and suggestion
    pub fn format_error(&self, error: &ApiError) -> String {
        let mut output = format!("{}: {}\n", self.colors.red("error"), error);

        if let Some(url) = &error.url {
            output.push_str(&format!("  {} {}\n", self.colors.dim("-->"), url));
        }
        if let Some(request_id) = &error.request_id {
            output.push_str(&format!("  {} {}\n", self.colors.dim("request id:"), request_id));
        }
        if let Some(suggestion) = error.suggestion() {
            output.push('\n');
            output.push_str(&format!("{}: {}\n", self.colors.dim("help"), suggestion));
        }

        output
    }

    /// Format any command failure, registry errors included
    pub fn format_report(&self, error: &anyhow::Error) -> String {
        match error.downcast_ref::<ApiError>() {
            Some(api_error) => self.format_error(api_error),
            None => format!("{}\n", self.format_simple(&format!("{:#}", error))),
        }
    }

    pub fn format_simple(&self, message: &str) -> String {
        format!("{}: {}", self.colors.red("error"), message)
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter() -> ErrorFormatter {
        ErrorFormatter::with_colors(ColorSupport::disabled())
    }

    #[test]
    fn test_format_http_error() {
        let error = ApiError::server(404, "X07REG_NOT_FOUND", "package not found")
            .with_url("https://api.example.test/packages/demo/owners")
            .with_request_id(Some("req-7".to_string()));

        let text = formatter().format_error(&error);
        assert_eq!(
            text,
            "error: X07REG_NOT_FOUND: package not found\n\
             \x20 --> https://api.example.test/packages/demo/owners\n\
             \x20 request id: req-7\n\
             \n\
             help: Check the package name and version spelling\n"
        );
    }

    #[test]
    fn test_format_report_downcasts() {
        let report = anyhow::Error::new(ApiError::timeout());
        let text = formatter().format_report(&report);
        assert!(text.starts_with("error: X07WEB_TIMEOUT: request timed out\n"));
        assert!(text.contains("help: "));

        let report = anyhow::anyhow!("no usable version of demo");
        assert_eq!(
            formatter().format_report(&report),
            "error: no usable version of demo\n"
        );
    }
}
