// Copyright 2025 eraflo
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

//! Error types shared across the event system.
//!
//! The bus itself has no failure modes: unsubscribing twice, flushing an empty
//! queue or destroying a provider twice are all no-ops. Errors only exist at the
//! edges, when a provider cannot reach its event source or when settings cannot
//! be loaded.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by an [`EventProvider`](crate::platform::EventProvider).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// One-time setup did not succeed; the provider is unusable.
    #[error("provider '{provider}' failed to initialize: {reason}")]
    Initialization {
        /// Name of the failing provider.
        provider: String,
        /// What went wrong.
        reason: String,
    },
    /// The external source the provider reads from is gone or unreachable.
    #[error("event source for provider '{provider}' is unavailable")]
    SourceUnavailable {
        /// Name of the failing provider.
        provider: String,
    },
}

/// Failure while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings document is not valid JSON for the expected shape.
    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
    /// The settings file could not be read.
    #[error("cannot read settings file '{path}': {source}")]
    Io {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
