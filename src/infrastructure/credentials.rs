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

use crate::domain::config::CloudProvider;

pub trait CredentialCheck: Send + Sync {
    /// Credential variables for `provider` that are not available.
    fn missing_credentials(&self, provider: CloudProvider) -> Vec<&'static str>;

    fn has_required_credential(&self, provider: CloudProvider) -> bool {
        self.missing_credentials(provider).is_empty()
    }
}

/// Looks credentials up in the process environment. Empty values count as missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialCheck for EnvCredentials {
    fn missing_credentials(&self, provider: CloudProvider) -> Vec<&'static str> {
        missing_from(provider, |var| std::env::var(var).ok())
    }
}

fn missing_from(
    provider: CloudProvider,
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<&'static str> {
    provider
        .required_credentials()
        .iter()
        .copied()
        .filter(|var| lookup(var).map(|v| v.trim().is_empty()).unwrap_or(true))
        .collect()
}
