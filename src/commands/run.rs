use anyhow::Result;
use std::path::Path;

use super::generate_report;
use super::reports::Report;

pub async fn execute(report: Report, output_dir: &Path, save: bool) -> Result<()> {
    let plan = report.plan()?;
    let mut options = plan.options;
    options.save &= save;

    generate_report(plan.provider, &plan.request, &options, output_dir).await?;
    Ok(())
}
