use super::display::{ConfigInfo, StatusIcon, TableRenderer};
use super::App;
use crate::domain::builder::{
    parse_flag_assignments, ConfigRequest, ConfigurationBuilder, SessionOutcome,
};
use crate::domain::config::CloudProvider;
use crate::shared::K1Error;
use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Create or update a configuration (interactive unless --provider is given)
    Create(CreateCommand),

    /// List stored configurations
    List(ListCommand),

    /// Show a configuration's artifacts and flags
    Show(ShowCommand),

    /// Delete a configuration (its directory is moved to the backup area)
    Delete(DeleteCommand),

    /// Delete every configuration
    DeleteAll(DeleteAllCommand),
}

impl ConfigCommands {
    pub async fn execute(&self, app: &App) -> anyhow::Result<()> {
        match self {
            ConfigCommands::Create(cmd) => cmd.execute(app).await,
            ConfigCommands::List(cmd) => cmd.execute(app),
            ConfigCommands::Show(cmd) => cmd.execute(app),
            ConfigCommands::Delete(cmd) => cmd.execute(app),
            ConfigCommands::DeleteAll(cmd) => cmd.execute(app),
        }
    }
}

#[derive(Parser, Debug, Clone, Default)]
pub struct CreateCommand {
    /// Cloud provider (civo, digitalocean, vultr, akamai, aws, google, azure, k3d)
    /// If omitted, the interactive builder starts
    #[arg(long, short = 'p')]
    pub provider: Option<String>,

    /// Region; defaults to the last region used
    #[arg(long, short = 'r')]
    pub region: Option<String>,

    /// Static prefix for generated variable names; defaults to the last prefix used
    #[arg(long)]
    pub prefix: Option<String>,

    /// kubefirst flags (-F name=value). Flags not given inherit the recorded defaults
    ///
    /// Example: -F cluster-name=demo -F node-type=g4s.kube.small
    #[arg(short = 'F', value_name = "NAME=VALUE")]
    pub flags: Vec<String>,
}

impl CreateCommand {
    pub async fn execute(&self, app: &App) -> anyhow::Result<()> {
        let client = app.cloud_client()?;
        let ctx = app.builder_context(&client);
        let renderer = TableRenderer::new();

        let Some(ref provider) = self.provider else {
            let builder = ConfigurationBuilder::new(ctx, app.prompter.as_ref());
            match builder.run().await? {
                SessionOutcome::Completed(summary) => print!("{}", renderer.render_summary(&summary)),
                SessionOutcome::Cancelled => println!("{} Cancelled, nothing was written", StatusIcon::INFO),
            }
            return Ok(());
        };

        let provider: CloudProvider = provider.parse()?;
        let request = ConfigRequest {
            provider,
            region: self.region.clone(),
            prefix: self.prefix.clone(),
            flags: parse_flag_assignments(&self.flags)?,
        };
        let summary = request.apply(&ctx)?;
        print!("{}", renderer.render_summary(&summary));
        Ok(())
    }
}

#[derive(Parser, Debug, Clone, Default)]
pub struct ListCommand {}

impl ListCommand {
    pub fn execute(&self, app: &App) -> anyhow::Result<()> {
        let doc = app.registry.load()?;
        let infos: Vec<ConfigInfo> = doc
            .configs
            .iter()
            .map(|(key, record)| ConfigInfo::from_record(key, record))
            .collect();
        println!("{}", TableRenderer::new().render_configs_list(&infos));

        let incomplete: Vec<String> = doc
            .configs
            .iter()
            .filter(|(_, record)| !app.registry.schema().is_well_formed(record))
            .map(|(key, _)| key.encode())
            .collect();
        if !incomplete.is_empty() {
            tracing::warn!("Records missing baseline flags: {}", incomplete.join(", "));
        }
        Ok(())
    }
}

#[derive(Parser, Debug, Clone, Default)]
pub struct ShowCommand {
    /// Configuration key (<provider>_<region>_<prefix>); prompts when omitted
    pub key: Option<String>,
}

impl ShowCommand {
    pub fn execute(&self, app: &App) -> anyhow::Result<()> {
        let Some(key) = app.resolve_key(self.key.as_deref(), "Configuration to show")? else {
            return Ok(());
        };
        let doc = app.registry.load()?;
        let record = doc
            .get(&key)
            .ok_or_else(|| K1Error::not_found(key.encode()))?;
        print!("{}", TableRenderer::new().render_config_detail(&key, record));
        Ok(())
    }
}

#[derive(Parser, Debug, Clone, Default)]
pub struct DeleteCommand {
    /// Configuration key (<provider>_<region>_<prefix>); prompts when omitted
    pub key: Option<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl DeleteCommand {
    pub fn execute(&self, app: &App) -> anyhow::Result<()> {
        let Some(key) = app.resolve_key(self.key.as_deref(), "Configuration to delete")? else {
            return Ok(());
        };
        if !self.yes && !app.prompter.confirm(&format!("Delete configuration {}?", key), false)? {
            println!("{} Cancelled", StatusIcon::INFO);
            return Ok(());
        }

        app.workspace.delete_configuration(&app.registry, &key)?;
        println!(
            "{} Deleted {} (backup under {})",
            StatusIcon::SUCCESS.green(),
            key.encode().bold(),
            app.workspace.backup_root().display()
        );
        Ok(())
    }
}

#[derive(Parser, Debug, Clone, Default)]
pub struct DeleteAllCommand {
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl DeleteAllCommand {
    pub fn execute(&self, app: &App) -> anyhow::Result<()> {
        let count = app.registry.load()?.configs.len();
        if count == 0 {
            println!("No configurations found");
            return Ok(());
        }
        if !self.yes
            && !app
                .prompter
                .confirm(&format!("Delete all {} configurations?", count), false)?
        {
            println!("{} Cancelled", StatusIcon::INFO);
            return Ok(());
        }

        let report = app.workspace.delete_all(&app.registry)?;
        for key in &report.deleted {
            println!("{} Deleted {}", StatusIcon::SUCCESS.green(), key.encode());
        }
        if let Some((key, e)) = report.failed {
            return Err(anyhow::Error::new(e).context(format!("Deleting {} failed", key)));
        }
        Ok(())
    }
}
