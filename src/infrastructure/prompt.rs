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

//! Interactive prompt primitives.

use crate::shared::error::K1Error;
use dialoguer::{Confirm, Input, Select};

pub trait Prompter: Send + Sync {
    /// `Ok(None)` when the user backs out of the selection.
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<Option<usize>, K1Error>;

    /// Free text. With a default, an empty answer returns the default.
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String, K1Error>;

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, K1Error>;
}

/// Terminal prompts backed by dialoguer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<Option<usize>, K1Error> {
        if items.is_empty() {
            return Err(K1Error::Prompt(format!("Nothing to select for '{}'", prompt)));
        }
        let selection = Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(default.min(items.len() - 1))
            .interact_opt()?;
        Ok(selection)
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String, K1Error> {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(default) = default.filter(|d| !d.is_empty()) {
            input = input.default(default.to_string()).show_default(true);
        }
        Ok(input.interact_text()?.trim().to_string())
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, K1Error> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}
