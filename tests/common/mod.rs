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

#![allow(dead_code)]

use k1space::domain::config::{CloudProvider, NodeTypeDescriptor};
use k1space::infrastructure::cloud::CloudClient;
use k1space::infrastructure::credentials::CredentialCheck;
use k1space::infrastructure::prompt::Prompter;
use k1space::K1Error;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Prompter that replays canned answers.
///
/// Selections and confirmations are consumed in order. Inputs are looked up by
/// prompt prefix; unknown prompts accept the offered default.
#[derive(Default)]
pub struct ScriptedPrompter {
    selections: Mutex<VecDeque<Option<usize>>>,
    confirmations: Mutex<VecDeque<bool>>,
    inputs: HashMap<String, String>,
    pub seen: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_select(self, answer: Option<usize>) -> Self {
        self.selections.lock().unwrap().push_back(answer);
        self
    }

    pub fn then_confirm(self, answer: bool) -> Self {
        self.confirmations.lock().unwrap().push_back(answer);
        self
    }

    pub fn answer(mut self, prompt_prefix: &str, answer: &str) -> Self {
        self.inputs
            .insert(prompt_prefix.to_string(), answer.to_string());
        self
    }

    /// Default offered for the first prompt starting with `prefix`.
    pub fn default_offered(&self, prefix: &str) -> Option<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .find(|(prompt, _)| prompt.starts_with(prefix))
            .and_then(|(_, default)| default.clone())
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&self, prompt: &str, items: &[String], _default: usize) -> Result<Option<usize>, K1Error> {
        self.seen.lock().unwrap().push((prompt.to_string(), None));
        let answer = self
            .selections
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| K1Error::Prompt(format!("no scripted selection for '{}'", prompt)))?;
        if let Some(index) = answer {
            assert!(index < items.len(), "selection {} out of range for '{}'", index, prompt);
        }
        Ok(answer)
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String, K1Error> {
        self.seen
            .lock()
            .unwrap()
            .push((prompt.to_string(), default.map(str::to_string)));
        let answer = self
            .inputs
            .iter()
            .find(|(prefix, _)| prompt.starts_with(prefix.as_str()))
            .map(|(_, answer)| answer.clone())
            .unwrap_or_default();
        if answer.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(answer)
    }

    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool, K1Error> {
        self.seen.lock().unwrap().push((prompt.to_string(), None));
        self.confirmations
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| K1Error::Prompt(format!("no scripted confirmation for '{}'", prompt)))
    }
}

pub struct AllCredentials;

impl CredentialCheck for AllCredentials {
    fn missing_credentials(&self, _provider: CloudProvider) -> Vec<&'static str> {
        Vec::new()
    }
}

pub struct NoCredentials;

impl CredentialCheck for NoCredentials {
    fn missing_credentials(&self, provider: CloudProvider) -> Vec<&'static str> {
        provider.required_credentials().to_vec()
    }
}

pub struct StaticCloudClient;

#[async_trait::async_trait]
impl CloudClient for StaticCloudClient {
    async fn list_regions(&self, _provider: CloudProvider) -> Result<Vec<String>, K1Error> {
        Ok(vec!["lon1".to_string(), "nyc1".to_string(), "fra1".to_string()])
    }

    async fn list_node_types(&self, _provider: CloudProvider) -> Result<Vec<NodeTypeDescriptor>, K1Error> {
        Ok(vec![
            NodeTypeDescriptor::new("g4s.kube.small", 2, 4096, 40),
            NodeTypeDescriptor::new("g4s.kube.medium", 4, 8192, 80),
        ])
    }
}

pub struct FailingCloudClient;

#[async_trait::async_trait]
impl CloudClient for FailingCloudClient {
    async fn list_regions(&self, provider: CloudProvider) -> Result<Vec<String>, K1Error> {
        Err(K1Error::provider_api(provider.as_str(), "503 Service Unavailable"))
    }

    async fn list_node_types(&self, provider: CloudProvider) -> Result<Vec<NodeTypeDescriptor>, K1Error> {
        Err(K1Error::provider_api(provider.as_str(), "503 Service Unavailable"))
    }
}
