use console::style;
use strum::IntoEnumIterator;

use quill::providers::factory::ProviderType;

use super::reports::Report;

pub fn execute() {
    println!("{}", style("Reports").bold());
    for report in Report::iter() {
        println!("  {:<26} {}", report.to_string(), style(report.description()).dim());
    }

    println!("\n{}", style("Providers").bold());
    for provider in ProviderType::iter() {
        let configured = std::env::var(provider.api_key_env()).is_ok_and(|key| !key.is_empty());
        let status = if configured {
            style("configured".to_string()).green()
        } else {
            style(format!("set {}", provider.api_key_env())).yellow()
        };
        println!(
            "  {:<8} {:<26} {}",
            provider.to_string(),
            provider.default_model(),
            status
        );
    }
}
