pub mod catalog;
pub mod cluster;
pub mod commands;
pub mod config;
pub mod display;
pub mod menu;

pub use commands::{CliArgs, Commands};

use crate::domain::builder::{BuilderContext, ScriptSettings};
use crate::domain::config::{AppConfig, ConfigurationKey};
use crate::infrastructure::cloud::{CloudClient, HttpCloudClient};
use crate::infrastructure::credentials::{CredentialCheck, EnvCredentials};
use crate::infrastructure::prompt::{Prompter, TerminalPrompter};
use crate::infrastructure::store::{CatalogStore, RegistryStore};
use crate::infrastructure::workspace::Workspace;
use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;

/// Stores and collaborators shared by every command.
pub struct App {
    pub config: AppConfig,
    pub registry: RegistryStore,
    pub catalog: CatalogStore,
    pub workspace: Workspace,
    pub prompter: Box<dyn Prompter>,
    pub credentials: Box<dyn CredentialCheck>,
}

impl App {
    pub fn load(home: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = AppConfig::load(home).context("Failed to load k1space settings")?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: AppConfig) -> Self {
        let timeout = Duration::from_secs(config.provider_timeout_secs);
        Self {
            registry: RegistryStore::open(
                config.registry_path(),
                config.home.clone(),
                config.record_schema.clone(),
            ),
            catalog: CatalogStore::open(config.catalog_path(), timeout),
            workspace: Workspace::new(&config.home),
            prompter: Box::new(TerminalPrompter),
            credentials: Box::new(EnvCredentials),
            config,
        }
    }

    pub fn with_prompter(mut self, prompter: Box<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    pub fn with_credentials(mut self, credentials: Box<dyn CredentialCheck>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn cloud_client(&self) -> anyhow::Result<HttpCloudClient> {
        let client = HttpCloudClient::new(
            &self.config.api_endpoints,
            self.config.provider_retries,
            Duration::from_secs(self.config.provider_timeout_secs),
        )?;
        Ok(client.with_env_tokens())
    }

    pub fn script_settings(&self) -> ScriptSettings {
        ScriptSettings {
            kubefirst_binary: self.config.kubefirst_binary.clone(),
            secrets_wrapper: self.config.secrets_wrapper.clone(),
        }
    }

    pub fn builder_context<'a>(&'a self, client: &'a dyn CloudClient) -> BuilderContext<'a> {
        BuilderContext {
            registry: &self.registry,
            catalog: &self.catalog,
            workspace: &self.workspace,
            client,
            credentials: self.credentials.as_ref(),
            scripts: self.script_settings(),
            default_prefix: self.config.default_prefix.clone(),
            catalog_fallback: self.config.catalog_fallback,
        }
    }

    /// Parses `key`, or asks the user to pick one of the stored
    /// configurations. `Ok(None)` when there is nothing to pick or the user
    /// backs out.
    pub fn resolve_key(&self, key: Option<&str>, prompt: &str) -> anyhow::Result<Option<ConfigurationKey>> {
        if let Some(key) = key {
            return Ok(Some(key.parse()?));
        }

        let keys: Vec<ConfigurationKey> = self.registry.load()?.configs.into_keys().collect();
        if keys.is_empty() {
            println!("No configurations found");
            return Ok(None);
        }
        let items: Vec<String> = keys.iter().map(ConfigurationKey::encode).collect();
        Ok(self
            .prompter
            .select(prompt, &items, 0)?
            .and_then(|i| keys.get(i).cloned()))
    }
}
