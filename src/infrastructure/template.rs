//! Page template
//!
//! The page template lives on disk at `<root>/templates/index.html` and is
//! re-read on every request, so edits show up without a restart. Rendering
//! uses MiniJinja with HTML auto-escaping.

use minijinja::{context, Environment};
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;

use crate::core::Batch;

pub const TEMPLATE_DIR: &str = "templates";
pub const PAGE_TEMPLATE: &str = "index.html";

/// Template failures, reported to the client as 500
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("open {}: {}", .path.display(), .source)]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template: {0}")]
    Render(#[from] minijinja::Error),
}

/// Path of the page template under `root`
pub fn page_template_path(root: &Path) -> PathBuf {
    root.join(TEMPLATE_DIR).join(PAGE_TEMPLATE)
}

/// Loaded, not yet parsed page template source
#[derive(Debug, Clone)]
pub struct PageTemplate {
    source: String,
}

impl PageTemplate {
    /// Read the page template from `<root>/templates/index.html`
    pub async fn load(root: &Path) -> Result<Self, TemplateError> {
        let path = page_template_path(root);
        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| TemplateError::Load { path, source })?;
        Ok(Self { source })
    }

    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Parse and render against a batch, records in generation order
    pub fn render(&self, batch: &Batch) -> Result<String, TemplateError> {
        let mut env = Environment::new();
        env.add_template(PAGE_TEMPLATE, &self.source)?;
        let template = env.get_template(PAGE_TEMPLATE)?;

        let generated_at = batch
            .generated_at()
            .format(&Rfc3339)
            .unwrap_or_default();

        let html = template.render(context! {
            records => batch.records(),
            batch_size => batch.len(),
            generated_at => generated_at,
        })?;
        Ok(html)
    }
}
