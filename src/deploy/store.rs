// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{debug, info};

use super::DeploymentRegistry;
use crate::error::Result;
use crate::traits::RegistryStore;

/// Registry persisted as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RegistryStore for JsonFileStore {
    async fn load(&self) -> Result<DeploymentRegistry> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => {
                let registry = DeploymentRegistry::from_json(&json)?;
                debug!(
                    path = %self.path.display(),
                    networks = registry.len(),
                    event = "deployments_loaded"
                );
                Ok(registry)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), event = "deployments_file_missing");
                Ok(DeploymentRegistry::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, registry: &DeploymentRegistry) -> Result<()> {
        let mut json = registry.to_json_pretty()?;
        json.push('\n');

        // Write-then-rename so readers never see a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        info!(
            path = %self.path.display(),
            networks = registry.len(),
            event = "deployments_saved"
        );
        Ok(())
    }
}

/// Registry kept in memory, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    registry: Arc<Mutex<DeploymentRegistry>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: DeploymentRegistry) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
            saves: Arc::default(),
        }
    }

    /// Last saved registry.
    pub fn snapshot(&self) -> DeploymentRegistry {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RegistryStore for MemoryStore {
    async fn load(&self) -> Result<DeploymentRegistry> {
        Ok(self.snapshot())
    }

    async fn save(&self, registry: &DeploymentRegistry) -> Result<()> {
        *self.registry.lock().unwrap_or_else(PoisonError::into_inner) = registry.clone();
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
