use super::display::{StatusIcon, TableRenderer};
use super::App;
use crate::domain::config::CloudProvider;
use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Subcommand, Debug, Clone)]
pub enum CatalogCommands {
    /// Fetch regions and node types from provider APIs
    Refresh(RefreshCommand),

    /// Show cached regions and node types
    Show(CatalogShowCommand),
}

impl CatalogCommands {
    pub async fn execute(&self, app: &App) -> anyhow::Result<()> {
        match self {
            CatalogCommands::Refresh(cmd) => cmd.execute(app).await,
            CatalogCommands::Show(cmd) => cmd.execute(app),
        }
    }
}

#[derive(Parser, Debug, Clone, Default)]
pub struct RefreshCommand {
    /// Provider to refresh; all providers with a live API when omitted
    pub provider: Option<String>,
}

impl RefreshCommand {
    pub async fn execute(&self, app: &App) -> anyhow::Result<()> {
        let providers = selected_providers(self.provider.as_deref())?;
        let client = app.cloud_client()?;

        let mut failed = Vec::new();
        for provider in providers.into_iter().filter(CloudProvider::has_live_catalog) {
            let missing = app.credentials.missing_credentials(provider);
            if !missing.is_empty() {
                println!(
                    "{} {} skipped: set {}",
                    StatusIcon::WARNING.yellow(),
                    provider,
                    missing.join(", ")
                );
                continue;
            }

            match app.catalog.refresh(&client, provider).await {
                Ok(doc) => println!(
                    "{} {}: {} regions, {} node types",
                    StatusIcon::SUCCESS.green(),
                    provider,
                    doc.regions(provider).len(),
                    doc.node_types(provider).len()
                ),
                Err(e) => {
                    println!("{} {}: {}", StatusIcon::ERROR.red(), provider, e);
                    failed.push(provider.as_str());
                }
            }
        }

        if !failed.is_empty() {
            anyhow::bail!("Catalog refresh failed for: {}", failed.join(", "));
        }
        Ok(())
    }
}

#[derive(Parser, Debug, Clone, Default)]
pub struct CatalogShowCommand {
    /// Provider to show; every provider when omitted
    pub provider: Option<String>,
}

impl CatalogShowCommand {
    pub fn execute(&self, app: &App) -> anyhow::Result<()> {
        let doc = app.catalog.load()?;
        let renderer = TableRenderer::new();
        for provider in selected_providers(self.provider.as_deref())? {
            let regions: Vec<String> = if provider.has_live_catalog() {
                doc.regions(provider).to_vec()
            } else {
                provider.static_regions().iter().map(|r| r.to_string()).collect()
            };
            println!(
                "{}",
                renderer.render_catalog(provider.display_name(), &regions, doc.node_types(provider))
            );
        }
        println!("Last updated: {}", doc.last_updated.to_rfc3339());
        Ok(())
    }
}

fn selected_providers(provider: Option<&str>) -> anyhow::Result<Vec<CloudProvider>> {
    match provider {
        Some(name) => Ok(vec![name.parse()?]),
        None => Ok(CloudProvider::ALL.to_vec()),
    }
}
