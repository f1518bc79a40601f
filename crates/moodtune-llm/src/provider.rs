// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::Result;
use async_trait::async_trait;

/// A generative text model reachable with a single prompt.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Send `prompt` and return the model's plain-text answer.
    async fn ask(&self, prompt: &str) -> Result<String>;
}
