use super::display::StatusIcon;
use super::App;
use crate::domain::builder::generator::render_destroy_command;
use crate::domain::config::{CloudProvider, ConfigurationKey, ConfigurationRecord};
use crate::infrastructure::process::ScriptRunner;
use crate::shared::K1Error;
use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug, Clone)]
pub enum ClusterCommands {
    /// Run a configuration's init script to create the cluster
    Provision(ProvisionCommand),

    /// Destroy the cluster created from a configuration
    Deprovision(DeprovisionCommand),
}

impl ClusterCommands {
    pub async fn execute(&self, app: &App) -> anyhow::Result<()> {
        match self {
            ClusterCommands::Provision(cmd) => cmd.execute(app).await,
            ClusterCommands::Deprovision(cmd) => cmd.execute(app).await,
        }
    }
}

#[derive(Parser, Debug, Clone, Default)]
pub struct ProvisionCommand {
    /// Configuration key (<provider>_<region>_<prefix>); prompts when omitted
    pub key: Option<String>,
}

impl ProvisionCommand {
    pub async fn execute(&self, app: &App) -> anyhow::Result<()> {
        let Some((key, record)) = load_record(app, self.key.as_deref(), "Configuration to provision")? else {
            return Ok(());
        };
        require_credentials(app, &key)?;

        let script = record
            .init_script()
            .map(PathBuf::from)
            .ok_or_else(|| K1Error::validation(format!("{} has no init script", key)))?;

        println!("🚀 Provisioning {}", key.encode().bold());
        ScriptRunner::default()
            .run_script(&script)
            .await
            .with_context(|| format!("Provisioning {} failed", key))?;
        println!("{} Provisioned {}", StatusIcon::SUCCESS.green(), key.encode());
        Ok(())
    }
}

#[derive(Parser, Debug, Clone, Default)]
pub struct DeprovisionCommand {
    /// Configuration key (<provider>_<region>_<prefix>); prompts when omitted
    pub key: Option<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl DeprovisionCommand {
    pub async fn execute(&self, app: &App) -> anyhow::Result<()> {
        let Some((key, record)) = load_record(app, self.key.as_deref(), "Configuration to deprovision")? else {
            return Ok(());
        };
        require_credentials(app, &key)?;

        if !self.yes
            && !app
                .prompter
                .confirm(&format!("Destroy the cluster for {}?", key), false)?
        {
            println!("{} Cancelled", StatusIcon::INFO);
            return Ok(());
        }

        let (env_file, dir) = destroy_target(&key, &record)?;
        let command = render_destroy_command(&key, &env_file, &app.script_settings());
        println!("🧨 Deprovisioning {}", key.encode().bold());
        ScriptRunner::default()
            .run_command(&command, Some(&dir))
            .await
            .with_context(|| format!("Deprovisioning {} failed", key))?;
        println!("{} Deprovisioned {}", StatusIcon::SUCCESS.green(), key.encode());
        Ok(())
    }
}

fn load_record(
    app: &App,
    key: Option<&str>,
    prompt: &str,
) -> anyhow::Result<Option<(ConfigurationKey, ConfigurationRecord)>> {
    let Some(key) = app.resolve_key(key, prompt)? else {
        return Ok(None);
    };
    let record = app
        .registry
        .load()?
        .configs
        .remove(&key)
        .ok_or_else(|| K1Error::not_found(key.encode()))?;
    Ok(Some((key, record)))
}

/// Env file and artifact directory as stored in the record.
fn destroy_target(
    key: &ConfigurationKey,
    record: &ConfigurationRecord,
) -> Result<(PathBuf, PathBuf), K1Error> {
    let env_file = record
        .env_file()
        .map(PathBuf::from)
        .ok_or_else(|| K1Error::validation(format!("{} has no env file", key)))?;
    let dir = env_file
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| K1Error::validation(format!("{} has no artifact directory", key)))?;
    Ok((env_file, dir))
}

fn require_credentials(app: &App, key: &ConfigurationKey) -> anyhow::Result<()> {
    let provider: CloudProvider = key.provider().parse()?;
    let missing = app.credentials.missing_credentials(provider);
    if !missing.is_empty() {
        return Err(K1Error::missing_credential(provider.as_str(), &missing).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::FlagMap;

    fn key() -> ConfigurationKey {
        ConfigurationKey::new("civo", "lon1", "K1").unwrap()
    }

    #[test]
    fn test_destroy_target_uses_recorded_paths() {
        let record = ConfigurationRecord {
            files: vec![
                "/old/home/civo/lon1/K1/.local.cloud.env".to_string(),
                "/old/home/civo/lon1/K1/00-init.sh".to_string(),
                "/old/home/civo/lon1/K1/01-kubefirst-cloud.sh".to_string(),
            ],
            flags: FlagMap::new(),
        };
        let (env_file, dir) = destroy_target(&key(), &record).unwrap();
        assert_eq!(env_file, PathBuf::from("/old/home/civo/lon1/K1/.local.cloud.env"));
        assert_eq!(dir, PathBuf::from("/old/home/civo/lon1/K1"));
    }

    #[test]
    fn test_destroy_target_requires_env_file() {
        let record = ConfigurationRecord::default();
        let err = destroy_target(&key(), &record).unwrap_err();
        assert!(matches!(err, K1Error::Validation(_)));
    }
}
