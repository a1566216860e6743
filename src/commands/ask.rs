use anyhow::Result;
use std::path::Path;

use quill::generator::ReportOptions;
use quill::models::generation::GenerationRequest;
use quill::providers::factory::ProviderType;

use super::generate_report;

pub struct AskArgs {
    pub provider: ProviderType,
    pub model: Option<String>,
    pub prompt: String,
    pub system: Option<String>,
    pub search: bool,
    pub save: bool,
}

pub async fn execute(args: AskArgs, output_dir: &Path) -> Result<()> {
    let model = args
        .model
        .unwrap_or_else(|| args.provider.default_model().to_string());

    let mut request = GenerationRequest::new(model.as_str(), args.prompt);
    if let Some(system) = args.system {
        request = request.with_system(system);
    }
    if args.search {
        request = request.with_search_grounding();
    }

    let mut options = ReportOptions::new("ask").with_title(format!("{}({})", args.provider, model));
    options.save = args.save;

    generate_report(args.provider, &request, &options, output_dir).await?;
    Ok(())
}
