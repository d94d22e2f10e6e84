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

use crate::shared::error::K1Error;
use std::path::Path;
use tokio::process::Command;

/// Runs generated scripts with the terminal attached.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    shell: String,
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self::new("bash")
    }
}

impl ScriptRunner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    pub async fn run_script(&self, script: &Path) -> Result<(), K1Error> {
        if !script.exists() {
            return Err(K1Error::validation(format!(
                "script {} does not exist; recreate the configuration",
                script.display()
            )));
        }
        let mut command = Command::new(&self.shell);
        command.arg(script);
        if let Some(dir) = script.parent() {
            command.current_dir(dir);
        }
        self.run(command, &script.display().to_string()).await
    }

    /// Runs `line` through `<shell> -c`.
    pub async fn run_command(&self, line: &str, working_dir: Option<&Path>) -> Result<(), K1Error> {
        let mut command = Command::new(&self.shell);
        command.arg("-c").arg(line);
        if let Some(dir) = working_dir.filter(|d| d.exists()) {
            command.current_dir(dir);
        }
        self.run(command, line).await
    }

    async fn run(&self, mut command: Command, label: &str) -> Result<(), K1Error> {
        tracing::info!("Running {}", label);
        let status = command
            .status()
            .await
            .map_err(|e| K1Error::command_failed(label, e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            let message = match status.code() {
                Some(code) => format!("exited with status {}", code),
                None => "terminated by signal".to_string(),
            };
            Err(K1Error::command_failed(label, message))
        }
    }
}
