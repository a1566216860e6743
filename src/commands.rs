pub mod ask;
pub mod list;
pub mod reports;
pub mod run;

use std::io;
use std::path::Path;

use quill::errors::ReportError;
use quill::generator::{ReportGenerator, ReportOptions};
use quill::models::generation::{GenerationRequest, GenerationResult};
use quill::providers::factory::{get_provider, ProviderType};
use quill::report::ReportWriter;

/// Build the provider from the environment and run one report to stdout
pub async fn generate_report(
    provider_type: ProviderType,
    request: &GenerationRequest,
    options: &ReportOptions,
    output_dir: &Path,
) -> Result<GenerationResult, ReportError> {
    let provider = get_provider(provider_type.config_from_env()?)?;
    let generator = ReportGenerator::new(provider)
        .with_writer(ReportWriter::new(output_dir))
        .with_spinner(console::user_attended());

    generator.generate(request, options, &mut io::stdout()).await
}
