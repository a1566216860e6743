use std::io::Write;
use std::path::PathBuf;

use cliclack::spinner;
use console::style;

use crate::errors::{FilesystemError, ReportError};
use crate::format::{format, format_titled};
use crate::models::generation::{GenerationRequest, GenerationResult};
use crate::providers::base::TextGenerationProvider;
use crate::report::{ReportMetadata, ReportWriter};

/// How one report run is presented and whether it is persisted
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Logical name of the entry function, used for the report file name
    pub function_name: Option<String>,
    /// Banner printed before the request goes out, as (message, title).
    /// It is written even when the provider call then fails.
    pub header: Option<(String, String)>,
    /// Line printed above the boxed answer
    pub heading: Option<String>,
    /// Title set into the answer box border
    pub title: Option<String>,
    /// Model name written to the report, when it should differ from the model id
    pub model_label: Option<String>,
    /// Report title, defaulting to the prompt's last user turn
    pub query: Option<String>,
    pub save: bool,
}

impl ReportOptions {
    pub fn new<S: Into<String>>(function_name: S) -> Self {
        Self {
            function_name: Some(function_name.into()),
            ..Default::default()
        }
    }

    pub fn with_header<M: Into<String>, T: Into<String>>(mut self, message: M, title: T) -> Self {
        self.header = Some((message.into(), title.into()));
        self
    }

    pub fn with_heading<S: Into<String>>(mut self, heading: S) -> Self {
        self.heading = Some(heading.into());
        self
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_model_label<S: Into<String>>(mut self, model_label: S) -> Self {
        self.model_label = Some(model_label.into());
        self
    }

    pub fn with_query<S: Into<String>>(mut self, query: S) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn saved(mut self) -> Self {
        self.save = true;
        self
    }
}

/// Issues one generation request, prints the result and optionally saves it.
pub struct ReportGenerator {
    provider: Box<dyn TextGenerationProvider>,
    writer: Option<ReportWriter>,
    show_spinner: bool,
}

impl ReportGenerator {
    pub fn new(provider: Box<dyn TextGenerationProvider>) -> Self {
        Self {
            provider,
            writer: None,
            show_spinner: false,
        }
    }

    pub fn with_writer(mut self, writer: ReportWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Show a spinner on the terminal while the provider works
    pub fn with_spinner(mut self, show_spinner: bool) -> Self {
        self.show_spinner = show_spinner;
        self
    }

    pub async fn generate<W: Write>(
        &self,
        request: &GenerationRequest,
        options: &ReportOptions,
        out: &mut W,
    ) -> Result<GenerationResult, ReportError> {
        if let Some((message, title)) = &options.header {
            let banner = format_titled(message, title);
            write_out(out, &style(banner).bold().yellow().bright().to_string())?;
        }

        tracing::debug!(
            provider = self.provider.name(),
            model = %request.model,
            "generating report"
        );

        let result = if self.show_spinner {
            let spin = spinner();
            spin.start("awaiting reply");
            let result = self.provider.generate(request).await;
            spin.stop("");
            result?
        } else {
            self.provider.generate(request).await?
        };

        if let Some(usage) = &result.usage {
            tracing::debug!(?usage, "token usage");
        }

        self.print(&result, options, out)?;

        if options.save {
            if let Some(writer) = &self.writer {
                let path = writer.write(&result.text, &Self::metadata(request, options, &result))?;
                write_out(
                    out,
                    &format!("{} {}\n", style("📝 Saved report to").bold(), path.display()),
                )?;
            }
        }

        write_out(out, &format!("{}\n", style("✔ Operation completed").bold().green()))?;

        Ok(result)
    }

    fn print<W: Write>(
        &self,
        result: &GenerationResult,
        options: &ReportOptions,
        out: &mut W,
    ) -> Result<(), FilesystemError> {
        if let Some(heading) = &options.heading {
            write_out(out, &format!("{}\n", style(heading).bold().blue()))?;
        }

        let boxed = match &options.title {
            Some(title) => format_titled(&result.text, title),
            None => format(&result.text),
        };
        write_out(out, &style(boxed).green().bright().to_string())?;

        if !result.sources.is_empty() {
            let mut listing = format!("{}\n", style("Sources:").bold());
            for source in &result.sources {
                let title = source.title.as_deref().unwrap_or("Source");
                listing.push_str(&format!("  - {} ({})\n", title, style(&source.url).dim()));
            }
            write_out(out, &listing)?;
        }

        if !result.tool_results.is_empty() {
            let mut listing = format!("{}\n", style("Tool results:").bold());
            for outcome in &result.tool_results {
                listing.push_str(&format!("  - {}\n", outcome.summary()));
            }
            write_out(out, &listing)?;
        }

        Ok(())
    }

    fn metadata(
        request: &GenerationRequest,
        options: &ReportOptions,
        result: &GenerationResult,
    ) -> ReportMetadata {
        let model = options.model_label.as_deref().unwrap_or(&request.model);
        let mut metadata = ReportMetadata::new(model).with_sources(result.sources.clone());
        if let Some(query) = options.query.as_deref().or_else(|| request.prompt.query()) {
            metadata = metadata.with_query(query);
        }
        if let Some(function_name) = &options.function_name {
            metadata = metadata.with_function_name(function_name);
        }
        metadata
    }
}

fn write_out<W: Write>(out: &mut W, text: &str) -> Result<(), FilesystemError> {
    out.write_all(text.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| FilesystemError::new("write", PathBuf::from("<output>"), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderError;
    use crate::models::generation::Source;
    use crate::models::message::Message;
    use crate::providers::mock::MockProvider;
    use crate::report::FixedClock;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn writer(dir: &std::path::Path) -> ReportWriter {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 2, 20, 9, 0, 0).unwrap());
        ReportWriter::new(dir).with_clock(Arc::new(clock))
    }

    #[tokio::test]
    async fn test_generate_prints_boxed_text() -> anyhow::Result<()> {
        let provider = MockProvider::new(vec![Ok(GenerationResult::new("Yo, atmosphere."))]);
        let calls = provider.calls();
        let generator = ReportGenerator::new(Box::new(provider));

        let request = GenerationRequest::new("llama-3.3-70b-versatile", "Explain atmosphere");
        let options = ReportOptions::new("explain_atmosphere").with_heading("🔥 Atmosphere:");
        let mut out = Vec::new();

        let result = generator.generate(&request, &options, &mut out).await?;
        let printed = String::from_utf8(out)?;

        assert_eq!(result.text, "Yo, atmosphere.");
        assert!(printed.contains("🔥 Atmosphere:"));
        assert!(printed.contains("│ Yo, atmosphere. │"));
        assert!(printed.contains("✔ Operation completed"));
        assert!(!printed.contains("Sources:"));
        assert_eq!(*calls.lock().unwrap(), vec!["llama-3.3-70b-versatile".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_saves_report() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let result = GenerationResult::new("Summit recap").with_sources(vec![Source::new(
            "https://ai.engineer",
            Some("AI Engineer".to_string()),
        )]);
        let generator = ReportGenerator::new(Box::new(MockProvider::new(vec![Ok(result)])))
            .with_writer(writer(dir.path()));

        let request = GenerationRequest::new(
            "gemini-2.5-flash",
            vec![Message::user("When was the AI engineer summit 2025")],
        );
        let options = ReportOptions::new("t1_func2")
            .with_model_label("google(gemini-2.5-flash) - Search Grounding")
            .saved();
        let mut out = Vec::new();

        generator.generate(&request, &options, &mut out).await?;

        let path = dir.path().join("t1_func2_2025-02-20T09-00-00-000Z.md");
        let doc = std::fs::read_to_string(&path)?;
        assert!(doc.starts_with("# When was the AI engineer summit 2025\n"));
        assert!(doc.contains("**Model**: google(gemini-2.5-flash) - Search Grounding\n"));
        assert!(doc.contains("\nSummit recap\n"));
        assert!(doc.contains("- [AI Engineer](https://ai.engineer)"));

        let printed = String::from_utf8(out)?;
        assert!(printed.contains("Sources:"));
        assert!(printed.contains("Saved report to"));

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_without_save_writes_nothing() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let output_dir = dir.path().join("rez");
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 2, 20, 9, 0, 0).unwrap());
        let generator = ReportGenerator::new(Box::new(MockProvider::new(vec![])))
            .with_writer(ReportWriter::new(&output_dir).with_clock(Arc::new(clock)));

        let request = GenerationRequest::new("m", "q");
        generator
            .generate(&request, &ReportOptions::new("f"), &mut Vec::new())
            .await?;

        assert!(!output_dir.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_provider_failure_is_surfaced() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let output_dir = dir.path().join("rez");
        let provider = MockProvider::new(vec![Err(ProviderError::Authentication(
            "Invalid API Key".to_string(),
        ))]);
        let generator = ReportGenerator::new(Box::new(provider))
            .with_writer(ReportWriter::new(&output_dir));

        let request = GenerationRequest::new("m", "q");
        let mut out = Vec::new();
        let result = generator
            .generate(&request, &ReportOptions::new("f").saved(), &mut out)
            .await;

        match result {
            Err(ReportError::Provider(ProviderError::Authentication(msg))) => {
                assert_eq!(msg, "Invalid API Key")
            }
            other => panic!("Expected provider error, got {:?}", other),
        }
        assert!(!output_dir.exists());
        assert!(!String::from_utf8(out)?.contains("Operation completed"));

        Ok(())
    }

    #[tokio::test]
    async fn test_header_precedes_failed_call() -> anyhow::Result<()> {
        let provider = MockProvider::new(vec![Err(ProviderError::Server("down".to_string()))]);
        let generator = ReportGenerator::new(Box::new(provider));
        let options = ReportOptions::new("f").with_header("Banner", "t");
        let mut out = Vec::new();

        let result = generator
            .generate(&GenerationRequest::new("m", "q"), &options, &mut out)
            .await;

        assert!(matches!(
            result,
            Err(ReportError::Provider(ProviderError::Server(_)))
        ));
        let printed = String::from_utf8(out)?;
        assert!(printed.contains("│ Banner │"));
        assert!(!printed.contains("Operation completed"));

        Ok(())
    }

    #[tokio::test]
    async fn test_header_and_title() -> anyhow::Result<()> {
        let generator =
            ReportGenerator::new(Box::new(MockProvider::new(vec![Ok(GenerationResult::new("42"))])));
        let options = ReportOptions::new("t1_func3")
            .with_header("Function calling", "t1_func3")
            .with_title("google(gemini-2.5-flash)");
        let mut out = Vec::new();

        generator
            .generate(&GenerationRequest::new("m", "q"), &options, &mut out)
            .await?;

        let printed = String::from_utf8(out)?;
        assert!(printed.contains("─ t1_func3 "));
        assert!(printed.contains("│ Function calling │"));
        assert!(printed.contains("─ google(gemini-2.5-flash) "));

        Ok(())
    }
}
