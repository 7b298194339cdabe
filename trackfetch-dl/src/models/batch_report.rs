//! End-of-batch summary and its HTML / text renderings

use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

use super::BatchResult;

/// Summary handed back to the caller once every row has been consumed
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub errors: Vec<String>,
    pub download_dir: PathBuf,
}

impl BatchReport {
    pub fn new(result: BatchResult, download_dir: PathBuf) -> Self {
        Self {
            succeeded: result.succeeded,
            errors: result.errors,
            download_dir,
        }
    }

    /// Rows that ended tagged or tag-failed
    pub fn processed_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn render_html(&self) -> String {
        let mut html = String::from("<h1>Download Complete</h1>");
        let _ = write!(
            html,
            "<p>Successfully processed: {} files.</p>",
            self.processed_count()
        );
        let _ = write!(
            html,
            "<p>Saved to: {}</p>",
            escape_html(&self.download_dir.display().to_string())
        );

        if !self.errors.is_empty() {
            html.push_str("<h2>Errors:</h2><ul>");
            for err in &self.errors {
                let _ = write!(html, "<li>{}</li>", escape_html(err));
            }
            html.push_str("</ul>");
        }

        html.push_str("<br><a href=\"/\">Go Back</a>");
        html
    }

    pub fn render_text(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "Successfully processed: {} files.", self.processed_count());
        let _ = writeln!(text, "Saved to: {}", self.download_dir.display());

        if !self.errors.is_empty() {
            let _ = writeln!(text, "Errors:");
            for err in &self.errors {
                let _ = writeln!(text, "  - {}", err);
            }
        }
        text
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
