//! Fills the profile template with the computed metrics and writes the output
//! document. Templates use handlebars syntax: `{{totalStars}}`,
//! `{{totalCommitsInPastYear}}` and `{{#each colors}}{{this}}{{/each}}`.

use crate::error::{Error, Result};
use crate::model::AggregateMetrics;
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Render `template` against `data`. Unknown names render empty.
pub fn render<T: Serialize>(template: &str, data: &T) -> Result<String> {
    Handlebars::new()
        .render_template(template, data)
        .map_err(|e| Error::Template(e.to_string()))
}

/// Read the template at `template_path`, render `metrics` into it and
/// overwrite `output_path`.
pub fn render_file(template_path: &Path, output_path: &Path, metrics: &AggregateMetrics) -> Result<()> {
    let template = std::fs::read_to_string(template_path)?;
    let output = render(&template, metrics)?;
    std::fs::write(output_path, output)?;

    info!(path = %output_path.display(), "wrote profile document");
    Ok(())
}
