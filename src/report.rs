use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::FilesystemError;
use crate::models::generation::Source;

const DEFAULT_FUNCTION_NAME: &str = "output";
const DEFAULT_TITLE: &str = "Analysis";
const DEFAULT_SOURCE_LABEL: &str = "Source";
const NO_SOURCES: &str = "No sources available";

/// What a report is about, supplied by the caller at write time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub model: String,
    pub query: Option<String>,
    pub function_name: Option<String>,
    pub sources: Option<Vec<Source>>,
}

impl ReportMetadata {
    pub fn new<S: Into<String>>(model: S) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_query<S: Into<String>>(mut self, query: S) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_function_name<S: Into<String>>(mut self, function_name: S) -> Self {
        self.function_name = Some(function_name.into());
        self
    }

    pub fn with_sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = Some(sources);
        self
    }
}

/// Source of "now" for report names and headers
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Writes timestamped markdown reports into one output directory.
pub struct ReportWriter {
    output_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl ReportWriter {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Render and write one report, returning its path. A file with the same
    /// name (same function name within the same millisecond) is overwritten.
    pub fn write(&self, content: &str, metadata: &ReportMetadata) -> Result<PathBuf, FilesystemError> {
        let now = self.clock.now();
        let path = self.output_dir.join(file_name(metadata, &now));

        fs::create_dir_all(&self.output_dir)
            .map_err(|e| FilesystemError::new("create directory", &self.output_dir, e))?;
        fs::write(&path, render(content, metadata, &now))
            .map_err(|e| FilesystemError::new("write", &path, e))?;

        tracing::info!(path = %path.display(), "report saved");
        Ok(path)
    }
}

/// ISO-8601 UTC with millisecond precision, made safe for file names
pub fn file_timestamp(now: &DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

pub fn file_name(metadata: &ReportMetadata, now: &DateTime<Utc>) -> String {
    let function_name = metadata
        .function_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_FUNCTION_NAME);
    // keep the file inside the output directory
    let function_name = function_name.replace(['/', '\\'], "_");
    format!("{}_{}.md", function_name, file_timestamp(now))
}

pub fn render(content: &str, metadata: &ReportMetadata, now: &DateTime<Utc>) -> String {
    let title = metadata
        .query
        .as_deref()
        .filter(|query| !query.is_empty())
        .unwrap_or(DEFAULT_TITLE);
    let generated = now.with_timezone(&Local).format("%-m/%-d/%Y, %-I:%M:%S %p");

    format!(
        "# {title}\n\n**Generated**: {generated}  \n**Model**: {model}\n\n## Content\n{content}\n\n## Sources\n{sources}\n",
        model = metadata.model,
        sources = render_sources(metadata.sources.as_deref().unwrap_or_default()),
    )
}

fn render_sources(sources: &[Source]) -> String {
    if sources.is_empty() {
        return NO_SOURCES.to_string();
    }
    sources
        .iter()
        .map(|source| {
            format!(
                "- [{}]({})",
                source
                    .title
                    .as_deref()
                    .filter(|title| !title.is_empty())
                    .unwrap_or(DEFAULT_SOURCE_LABEL),
                source.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 18, 10, 15, 30).unwrap()
            + chrono::Duration::milliseconds(123)
    }

    #[test]
    fn test_file_timestamp_is_sanitized() {
        assert_eq!(file_timestamp(&instant()), "2025-06-18T10-15-30-123Z");
    }

    #[test]
    fn test_file_name_defaults() {
        let metadata = ReportMetadata::new("m");
        assert_eq!(
            file_name(&metadata, &instant()),
            "output_2025-06-18T10-15-30-123Z.md"
        );

        let metadata = metadata.with_function_name("googleSearchGrounding");
        assert_eq!(
            file_name(&metadata, &instant()),
            "googleSearchGrounding_2025-06-18T10-15-30-123Z.md"
        );
    }

    #[test]
    fn test_file_name_strips_separators() {
        let metadata = ReportMetadata::new("m").with_function_name("../a\\b");
        assert_eq!(
            file_name(&metadata, &instant()),
            ".._a_b_2025-06-18T10-15-30-123Z.md"
        );
    }

    #[test]
    fn test_render_without_sources() {
        let doc = render("body", &ReportMetadata::new("m"), &instant());
        assert!(doc.starts_with("# Analysis\n\n**Generated**: "));
        assert!(doc.ends_with("## Sources\nNo sources available\n"));
    }

    #[test]
    fn test_render_empty_sources_is_placeholder() {
        let metadata = ReportMetadata::new("m").with_sources(vec![]);
        let doc = render("body", &metadata, &instant());
        assert!(doc.ends_with("## Sources\nNo sources available\n"));
    }

    #[test]
    fn test_render_sources_in_order() {
        let metadata = ReportMetadata::new("m").with_sources(vec![
            Source::new("https://a.example", Some("A".to_string())),
            Source::new("https://b.example", None),
            Source::new("https://c.example", Some("C".to_string())),
        ]);
        let doc = render("body", &metadata, &instant());
        let sources = doc.split("## Sources\n").nth(1).unwrap();
        assert_eq!(
            sources,
            "- [A](https://a.example)\n- [Source](https://b.example)\n- [C](https://c.example)\n"
        );
    }
}
