//! Human and JSON rendering for CLI results

use hubfile_core::domain::UploadReport;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
    /// Renders the final report of an upload session
    fn report(&self, report: &UploadReport);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &serde_json::Value) {}

    fn report(&self, report: &UploadReport) {
        if report.success() {
            self.success(&format!("Uploaded {}", report.blob_name()));
        } else {
            self.error(&format!("Upload of {} failed", report.blob_name()));
        }
        self.info(report.status_detail());
        if let Some(correlation_id) = report.correlation_id() {
            self.info(&format!("Correlation id: {correlation_id}"));
        }
        if report.success() {
            if let Some(notify_error) = report.notify_error() {
                self.warn(&notify_error.to_string());
            }
        }
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
    fn report(&self, report: &UploadReport) {
        self.print_json(&report_json(report));
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter),
    }
}

/// JSON document describing a finished session
pub fn report_json(report: &UploadReport) -> serde_json::Value {
    serde_json::json!({
        "success": report.success(),
        "state": report.state().to_string(),
        "session_id": report.session_id().to_string(),
        "blob_name": report.blob_name().as_str(),
        "correlation_id": report.correlation_id().map(|c| c.as_str()),
        "status_code": report.status_code(),
        "status_detail": report.status_detail(),
        "error": report.error().map(|e| e.to_string()),
        "notify_error": report.notify_error().map(|e| e.to_string()),
        "started_at": report.started_at().to_rfc3339(),
        "completed_at": report.completed_at().to_rfc3339(),
    })
}
