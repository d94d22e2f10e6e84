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

//! Configuration domain

pub mod catalog;
pub mod key;
pub mod provider;
pub mod registry;
pub mod settings;

pub use self::catalog::{CloudCatalogDocument, NodeTypeDescriptor};
pub use self::key::ConfigurationKey;
pub use self::provider::{CloudProvider, FlagSpec, FLAG_CLOUD_REGION, FLAG_NODE_TYPE};
pub use self::registry::{
    normalize_artifact_path, validate_flag_name, validate_flag_names, ArtifactPaths,
    ConfigurationRecord, FlagMap, RecordSchema, RegistryDocument, REGISTRY_VERSION,
};
pub use self::settings::{AppConfig, CatalogFallback};
