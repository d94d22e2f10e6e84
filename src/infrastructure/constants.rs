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

/// Home directory layout
pub const DEFAULT_HOME_SUBDIR: &str = ".ssot/k1space";
pub const REGISTRY_FILE_NAME: &str = ".k1space.index.toml";
pub const CATALOG_FILE_NAME: &str = ".k1space.clouds.toml";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const BACKUP_DIR_NAME: &str = ".backup";

/// Environment overrides
pub const HOME_ENV_VAR: &str = "K1SPACE_HOME";
pub const CONFIG_ENV_VAR: &str = "K1SPACE_CONFIG";

/// Generated artifacts, in record order
pub const ENV_FILE_NAME: &str = ".local.cloud.env";
pub const INIT_SCRIPT_NAME: &str = "00-init.sh";
pub const PROVIDER_SCRIPT_NAME: &str = "01-kubefirst-cloud.sh";

/// Script permissions
pub const SCRIPT_FILE_MODE: u32 = 0o755;
pub const ENV_FILE_MODE: u32 = 0o600;

/// Cloud provider API base URLs
pub const CIVO_API_URL: &str = "https://api.civo.com/v2";
pub const DIGITALOCEAN_API_URL: &str = "https://api.digitalocean.com/v2";
pub const VULTR_API_URL: &str = "https://api.vultr.com/v2";
pub const AKAMAI_API_URL: &str = "https://api.linode.com/v4";

/// Retry backoff for provider APIs
pub const RETRY_MIN_DELAY_MS: u64 = 200;
pub const RETRY_MAX_DELAY_MS: u64 = 2000;
