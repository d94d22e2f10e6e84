// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Interactive configuration session.
//!
//! The session walks `Start -> PrefixAndProvider -> RefreshCatalog ->
//! RegionAndNodeType -> FlagCollection -> Generate -> PersistRecord -> Summary`.
//! Nothing is written before `Generate`; a cancelled prompt ends the session
//! without an error.

use super::generator::{render, RenderedArtifacts, ScriptSettings};
use crate::domain::config::{
    CatalogFallback, CloudCatalogDocument, CloudProvider, ConfigurationKey, ConfigurationRecord,
    FlagMap, RegistryDocument, FLAG_CLOUD_REGION, FLAG_NODE_TYPE,
};
use crate::infrastructure::cloud::CloudClient;
use crate::infrastructure::credentials::CredentialCheck;
use crate::infrastructure::prompt::Prompter;
use crate::infrastructure::store::{CatalogStore, RegistryStore};
use crate::infrastructure::workspace::Workspace;
use crate::shared::error::K1Error;
use chrono::Utc;
use std::path::PathBuf;

/// Region used for providers that run locally.
pub const LOCAL_REGION: &str = "local";

/// Everything a session reads from or writes to.
pub struct BuilderContext<'a> {
    pub registry: &'a RegistryStore,
    pub catalog: &'a CatalogStore,
    pub workspace: &'a Workspace,
    pub client: &'a dyn CloudClient,
    pub credentials: &'a dyn CredentialCheck,
    pub scripts: ScriptSettings,
    pub default_prefix: String,
    pub catalog_fallback: CatalogFallback,
}

impl BuilderContext<'_> {
    pub fn require_credentials(&self, provider: CloudProvider) -> Result<(), K1Error> {
        let missing = self.credentials.missing_credentials(provider);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(K1Error::missing_credential(provider.as_str(), &missing))
        }
    }

    /// Renders the artifacts for the record `flags` would produce and writes
    /// them to disk. The registry is not touched.
    pub fn generate(
        &self,
        doc: &RegistryDocument,
        key: &ConfigurationKey,
        flags: &FlagMap,
    ) -> Result<RenderedArtifacts, K1Error> {
        let paths = self.registry.artifact_paths(key);
        let mut preview = doc.clone();
        let merged = preview
            .upsert(key.clone(), flags, &paths, self.registry.schema(), Utc::now())
            .flags
            .clone();

        let rendered = render(key, &merged, &paths, &self.scripts)?;
        self.workspace.write_artifacts(&rendered)?;
        Ok(rendered)
    }

    pub fn persist(&self, key: &ConfigurationKey, flags: &FlagMap) -> Result<BuildSummary, K1Error> {
        let doc = self.registry.upsert(key, flags)?;
        let record = doc
            .get(key)
            .cloned()
            .ok_or_else(|| K1Error::not_found(key.encode()))?;
        Ok(BuildSummary {
            key: key.clone(),
            record,
        })
    }
}

/// In-memory configuration being assembled.
#[derive(Debug, Clone, Default)]
pub struct CloudConfig {
    pub prefix: String,
    pub provider: Option<CloudProvider>,
    pub region: String,
    pub node_type: String,
    pub flags: FlagMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub key: ConfigurationKey,
    pub record: ConfigurationRecord,
}

impl BuildSummary {
    pub fn init_script(&self) -> Option<PathBuf> {
        self.record.init_script().map(PathBuf::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed(BuildSummary),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Start,
    PrefixAndProvider,
    RefreshCatalog,
    RegionAndNodeType,
    FlagCollection,
    Generate,
    PersistRecord,
    Summary,
    Terminal,
}

enum Transition {
    Next(BuilderState),
    Cancel,
}

pub struct ConfigurationBuilder<'a> {
    ctx: BuilderContext<'a>,
    prompter: &'a dyn Prompter,
    state: BuilderState,
    draft: CloudConfig,
    registry: RegistryDocument,
    catalog: CloudCatalogDocument,
    key: Option<ConfigurationKey>,
    summary: Option<BuildSummary>,
}

impl<'a> ConfigurationBuilder<'a> {
    pub fn new(ctx: BuilderContext<'a>, prompter: &'a dyn Prompter) -> Self {
        Self {
            ctx,
            prompter,
            state: BuilderState::Start,
            draft: CloudConfig::default(),
            registry: RegistryDocument::new(Utc::now()),
            catalog: CloudCatalogDocument::new(Utc::now()),
            key: None,
            summary: None,
        }
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub async fn run(mut self) -> Result<SessionOutcome, K1Error> {
        loop {
            tracing::debug!("Builder state: {:?}", self.state);
            let transition = match self.state {
                BuilderState::Start => self.start()?,
                BuilderState::PrefixAndProvider => self.prefix_and_provider()?,
                BuilderState::RefreshCatalog => self.refresh_catalog().await?,
                BuilderState::RegionAndNodeType => self.region_and_node_type()?,
                BuilderState::FlagCollection => self.flag_collection()?,
                BuilderState::Generate => self.generate()?,
                BuilderState::PersistRecord => self.persist_record()?,
                BuilderState::Summary => Transition::Next(BuilderState::Terminal),
                BuilderState::Terminal => {
                    return self
                        .summary
                        .take()
                        .map(SessionOutcome::Completed)
                        .ok_or_else(|| K1Error::validation("session ended without a record"));
                }
            };

            match transition {
                Transition::Next(state) => self.state = state,
                Transition::Cancel => {
                    tracing::info!("Configuration session cancelled in {:?}", self.state);
                    return Ok(SessionOutcome::Cancelled);
                }
            }
        }
    }

    fn start(&mut self) -> Result<Transition, K1Error> {
        self.registry = self.ctx.registry.load()?;
        Ok(Transition::Next(BuilderState::PrefixAndProvider))
    }

    fn prefix_and_provider(&mut self) -> Result<Transition, K1Error> {
        let default_prefix = self
            .registry
            .last_prefix
            .clone()
            .unwrap_or_else(|| self.ctx.default_prefix.clone());
        let prefix = self.prompter.input("Static prefix", Some(&default_prefix))?;
        self.draft.prefix = if prefix.is_empty() { default_prefix } else { prefix };

        let items: Vec<String> = CloudProvider::ALL
            .iter()
            .map(|p| p.display_name().to_string())
            .collect();
        let Some(index) = self.prompter.select("Cloud provider", &items, 0)? else {
            return Ok(Transition::Cancel);
        };
        let provider = CloudProvider::ALL
            .get(index)
            .copied()
            .ok_or_else(|| K1Error::validation(format!("no provider at index {}", index)))?;

        self.ctx.require_credentials(provider)?;
        self.draft.provider = Some(provider);

        Ok(Transition::Next(if provider.has_live_catalog() {
            BuilderState::RefreshCatalog
        } else {
            BuilderState::RegionAndNodeType
        }))
    }

    async fn refresh_catalog(&mut self) -> Result<Transition, K1Error> {
        let provider = self.provider()?;
        match self.ctx.catalog.refresh(self.ctx.client, provider).await {
            Ok(doc) => self.catalog = doc,
            Err(e) if self.ctx.catalog_fallback == CatalogFallback::LastSnapshot => {
                let snapshot = self.ctx.catalog.load()?;
                if !snapshot.has_snapshot(provider) {
                    return Err(e);
                }
                tracing::warn!("Using cached catalog for {}: {}", provider, e);
                self.catalog = snapshot;
            }
            Err(e) => return Err(e),
        }
        Ok(Transition::Next(BuilderState::RegionAndNodeType))
    }

    fn region_and_node_type(&mut self) -> Result<Transition, K1Error> {
        let provider = self.provider()?;

        if provider.is_local() {
            self.draft.region = LOCAL_REGION.to_string();
        } else {
            let regions: Vec<String> = if provider.has_live_catalog() {
                self.catalog.regions(provider).to_vec()
            } else {
                provider.static_regions().iter().map(|r| r.to_string()).collect()
            };
            let Some(region) = self.choose("Region", &regions, FLAG_CLOUD_REGION)? else {
                return Ok(Transition::Cancel);
            };
            self.draft.region = region;
            self.draft
                .flags
                .insert(FLAG_CLOUD_REGION.to_string(), self.draft.region.clone());

            let node_types = self.catalog.node_types(provider);
            let names: Vec<String> = node_types.iter().map(|n| n.name.clone()).collect();
            let labels: Vec<String> = node_types.iter().map(|n| n.label()).collect();
            let node_type = if names.is_empty() {
                let default = self.registry.default_for(FLAG_NODE_TYPE).map(str::to_string);
                let answer = self.prompter.input("Node type", default.as_deref())?;
                if answer.is_empty() {
                    default.unwrap_or_default()
                } else {
                    answer
                }
            } else {
                let default = self
                    .registry
                    .default_for(FLAG_NODE_TYPE)
                    .and_then(|d| names.iter().position(|n| n == d))
                    .unwrap_or(0);
                let Some(index) = self.prompter.select("Node type", &labels, default)? else {
                    return Ok(Transition::Cancel);
                };
                names.get(index).cloned().unwrap_or_default()
            };
            self.draft.node_type = node_type;
            self.draft
                .flags
                .insert(FLAG_NODE_TYPE.to_string(), self.draft.node_type.clone());
        }

        let key = ConfigurationKey::new(provider.as_str(), &self.draft.region, &self.draft.prefix)?;
        if self.registry.get(&key).is_some() {
            tracing::info!("Configuration {} exists and will be updated", key);
        }
        self.key = Some(key);
        Ok(Transition::Next(BuilderState::FlagCollection))
    }

    fn flag_collection(&mut self) -> Result<Transition, K1Error> {
        let provider = self.provider()?;
        for spec in provider.declared_flags() {
            let default = self
                .registry
                .default_for(spec.name)
                .or(spec.fallback)
                .map(str::to_string);
            let prompt = format!("{} ({})", spec.name, spec.description);
            let answer = self.prompter.input(&prompt, default.as_deref())?;
            let value = if answer.is_empty() {
                default.unwrap_or_default()
            } else {
                answer
            };
            self.draft.flags.insert(spec.name.to_string(), value);
        }

        let key = self.key()?;
        if !self
            .prompter
            .confirm(&format!("Generate configuration {}?", key), true)?
        {
            return Ok(Transition::Cancel);
        }
        Ok(Transition::Next(BuilderState::Generate))
    }

    fn generate(&mut self) -> Result<Transition, K1Error> {
        let key = self.key()?;
        let rendered = self.ctx.generate(&self.registry, &key, &self.draft.flags)?;
        tracing::info!("Generated artifacts in {}", rendered.paths.dir.display());
        Ok(Transition::Next(BuilderState::PersistRecord))
    }

    fn persist_record(&mut self) -> Result<Transition, K1Error> {
        let key = self.key()?;
        self.summary = Some(self.ctx.persist(&key, &self.draft.flags)?);
        Ok(Transition::Next(BuilderState::Summary))
    }

    /// Select from `items`, preselecting the registry default for `flag`.
    /// Falls back to free text when there is nothing to select.
    fn choose(&self, prompt: &str, items: &[String], flag: &str) -> Result<Option<String>, K1Error> {
        let default = self.registry.default_for(flag);
        if items.is_empty() {
            let answer = self.prompter.input(prompt, default)?;
            let value = if answer.is_empty() {
                default.unwrap_or_default().to_string()
            } else {
                answer
            };
            if value.is_empty() {
                return Err(K1Error::validation(format!("{} is required", prompt)));
            }
            return Ok(Some(value));
        }

        let index = default
            .and_then(|d| items.iter().position(|i| i == d))
            .unwrap_or(0);
        Ok(self
            .prompter
            .select(prompt, items, index)?
            .and_then(|i| items.get(i).cloned()))
    }

    fn provider(&self) -> Result<CloudProvider, K1Error> {
        self.draft
            .provider
            .ok_or_else(|| K1Error::validation("no provider selected"))
    }

    fn key(&self) -> Result<ConfigurationKey, K1Error> {
        self.key
            .clone()
            .ok_or_else(|| K1Error::validation("configuration key is incomplete"))
    }
}
