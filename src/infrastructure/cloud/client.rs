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

use crate::domain::config::{CloudProvider, NodeTypeDescriptor};
use crate::shared::error::K1Error;

#[async_trait::async_trait]
pub trait CloudClient: Send + Sync {
    async fn list_regions(&self, provider: CloudProvider) -> Result<Vec<String>, K1Error>;

    async fn list_node_types(
        &self,
        provider: CloudProvider,
    ) -> Result<Vec<NodeTypeDescriptor>, K1Error>;
}
