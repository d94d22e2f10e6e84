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

//! Renders the env file, init script and provider script for a configuration.
//!
//! Rendering is pure: the caller decides where and whether the text is written.
//! Flags are emitted in lexicographic order in both the env file and the
//! provider script, so identical flag sets always produce identical bytes.

use crate::domain::config::{validate_flag_name, ArtifactPaths, ConfigurationKey, FlagMap};
use crate::shared::error::K1Error;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

/// External commands the generated scripts call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSettings {
    pub kubefirst_binary: String,
    pub secrets_wrapper: String,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            kubefirst_binary: "kubefirst".to_string(),
            secrets_wrapper: "op inject -i".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifacts {
    pub paths: ArtifactPaths,
    pub env_file: String,
    pub init_script: String,
    pub provider_script: String,
}

impl RenderedArtifacts {
    /// `(path, content, executable)` for each artifact, in record order.
    pub fn files(&self) -> [(&Path, &str, bool); 3] {
        [
            (self.paths.env_file.as_path(), self.env_file.as_str(), false),
            (self.paths.init_script.as_path(), self.init_script.as_str(), true),
            (
                self.paths.provider_script.as_path(),
                self.provider_script.as_str(),
                true,
            ),
        ]
    }
}

/// `<PREFIX>_<PROVIDER>_<REGION>_<FLAG>`. The prefix keeps its case, the
/// other segments are upper-cased; anything not alphanumeric becomes `_`.
pub fn env_var_name(key: &ConfigurationKey, flag: &str) -> String {
    format!(
        "{}_{}_{}_{}",
        sanitize(key.prefix()),
        sanitize(key.provider()).to_uppercase(),
        sanitize(key.region()).to_uppercase(),
        sanitize(flag).to_uppercase()
    )
}

/// Every flag name must be valid and map to its own environment variable.
pub fn validate_flags(key: &ConfigurationKey, flags: &FlagMap) -> Result<(), K1Error> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for flag in flags.keys() {
        validate_flag_name(flag)?;
        if let Some(other) = seen.insert(env_var_name(key, flag), flag) {
            return Err(K1Error::validation(format!(
                "flags '{}' and '{}' both map to {}",
                other,
                flag,
                env_var_name(key, flag)
            )));
        }
    }
    Ok(())
}

pub fn render(
    key: &ConfigurationKey,
    flags: &FlagMap,
    paths: &ArtifactPaths,
    settings: &ScriptSettings,
) -> Result<RenderedArtifacts, K1Error> {
    validate_flags(key, flags)?;
    Ok(RenderedArtifacts {
        paths: paths.clone(),
        env_file: render_env_file(key, flags),
        init_script: render_init_script(paths, settings),
        provider_script: render_provider_script(key, flags, settings),
    })
}

/// Empty values are left out; the bootstrap binary then applies its own default.
pub fn render_env_file(key: &ConfigurationKey, flags: &FlagMap) -> String {
    let mut out = String::new();
    for (flag, value) in rendered_flags(flags) {
        let _ = writeln!(
            out,
            "export {}=\"{}\"",
            env_var_name(key, flag),
            shell_escape(value)
        );
    }
    out
}

pub fn render_init_script(paths: &ArtifactPaths, settings: &ScriptSettings) -> String {
    format!(
        "#!/usr/bin/env bash\nsource <({} {})\nbash {}\n",
        settings.secrets_wrapper,
        quoted_path(&paths.env_file),
        quoted_path(&paths.provider_script)
    )
}

pub fn render_provider_script(
    key: &ConfigurationKey,
    flags: &FlagMap,
    settings: &ScriptSettings,
) -> String {
    let mut lines = vec![format!(
        "{} {} create",
        settings.kubefirst_binary,
        key.provider()
    )];
    for (flag, _) in rendered_flags(flags) {
        lines.push(format!("  --{} \"${}\"", flag, env_var_name(key, flag)));
    }
    format!("#!/usr/bin/env bash\n{}\n", lines.join(" \\\n"))
}

/// Shell command that loads the env file through the secrets wrapper and
/// tears the cluster down.
pub fn render_destroy_command(
    key: &ConfigurationKey,
    env_file: &Path,
    settings: &ScriptSettings,
) -> String {
    format!(
        "source <({} {}) && {} {} destroy",
        settings.secrets_wrapper,
        quoted_path(env_file),
        settings.kubefirst_binary,
        key.provider()
    )
}

fn rendered_flags(flags: &FlagMap) -> impl Iterator<Item = (&str, &str)> {
    flags
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(flag, value)| (flag.as_str(), value.as_str()))
}

fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn shell_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Single-quoted, so nothing inside the path is expanded by the shell.
fn quoted_path(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    format!("'{}'", path.replace('\'', "'\\''"))
}
