//! Experiment and organization storage
//!
//! Async traits over the data layer plus `MemoryStore`, which serves both from
//! in-process maps and can be seeded from a JSON snapshot file.

use crate::errors::{PromptLabError, PromptLabResult};
use async_trait::async_trait;
use promptlab_core::{
    Experiment, Organization, OrganizationUpdate, PromptVariant, TemplateVariable, TestScenario,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

#[async_trait]
pub trait ExperimentStore: Send + Sync {
    async fn find_experiment(&self, experiment_id: &str) -> PromptLabResult<Option<Experiment>>;

    async fn list_variables(&self, experiment_id: &str) -> PromptLabResult<Vec<TemplateVariable>>;

    /// Visible scenarios by ascending sort index, at most `limit`
    async fn list_visible_scenarios(
        &self,
        experiment_id: &str,
        limit: usize,
    ) -> PromptLabResult<Vec<TestScenario>>;

    /// Visible variant with the lowest sort index
    async fn first_visible_prompt_variant(
        &self,
        experiment_id: &str,
    ) -> PromptLabResult<Option<PromptVariant>>;
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn get_organization(&self, id: &str) -> PromptLabResult<Option<Organization>>;

    async fn update_organization(&self, update: OrganizationUpdate) -> PromptLabResult<Organization>;
}

/// On-disk seed format for `MemoryStore`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub experiments: Vec<Experiment>,
    #[serde(default)]
    pub template_variables: Vec<TemplateVariable>,
    #[serde(default)]
    pub test_scenarios: Vec<TestScenario>,
    #[serde(default)]
    pub prompt_variants: Vec<PromptVariant>,
}

#[derive(Default)]
pub struct MemoryStore {
    organizations: RwLock<HashMap<String, Organization>>,
    experiments: RwLock<HashMap<String, Experiment>>,
    variables: RwLock<Vec<TemplateVariable>>,
    scenarios: RwLock<Vec<TestScenario>>,
    variants: RwLock<Vec<PromptVariant>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            organizations: RwLock::new(
                snapshot
                    .organizations
                    .into_iter()
                    .map(|org| (org.id.clone(), org))
                    .collect(),
            ),
            experiments: RwLock::new(
                snapshot
                    .experiments
                    .into_iter()
                    .map(|exp| (exp.id.clone(), exp))
                    .collect(),
            ),
            variables: RwLock::new(snapshot.template_variables),
            scenarios: RwLock::new(snapshot.test_scenarios),
            variants: RwLock::new(snapshot.prompt_variants),
        }
    }

    /// Load a snapshot file. A missing file is an error.
    pub fn load(path: &Path) -> PromptLabResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| PromptLabError::FileOperation {
            path: path.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;
        let snapshot: StoreSnapshot =
            serde_json::from_str(&data).map_err(|e| PromptLabError::Store {
                operation: "load snapshot".to_string(),
                details: e.to_string(),
            })?;

        tracing::info!(
            path = %path.display(),
            experiments = snapshot.experiments.len(),
            organizations = snapshot.organizations.len(),
            "loaded store snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub async fn insert_organization(&self, organization: Organization) {
        self.organizations
            .write()
            .await
            .insert(organization.id.clone(), organization);
    }

    pub async fn insert_experiment(&self, experiment: Experiment) {
        self.experiments
            .write()
            .await
            .insert(experiment.id.clone(), experiment);
    }

    pub async fn insert_variable(&self, variable: TemplateVariable) {
        self.variables.write().await.push(variable);
    }

    pub async fn insert_scenario(&self, scenario: TestScenario) {
        self.scenarios.write().await.push(scenario);
    }

    pub async fn insert_prompt_variant(&self, variant: PromptVariant) {
        self.variants.write().await.push(variant);
    }
}

#[async_trait]
impl ExperimentStore for MemoryStore {
    async fn find_experiment(&self, experiment_id: &str) -> PromptLabResult<Option<Experiment>> {
        Ok(self.experiments.read().await.get(experiment_id).cloned())
    }

    async fn list_variables(&self, experiment_id: &str) -> PromptLabResult<Vec<TemplateVariable>> {
        Ok(self
            .variables
            .read()
            .await
            .iter()
            .filter(|v| v.experiment_id == experiment_id)
            .cloned()
            .collect())
    }

    async fn list_visible_scenarios(
        &self,
        experiment_id: &str,
        limit: usize,
    ) -> PromptLabResult<Vec<TestScenario>> {
        let mut scenarios: Vec<TestScenario> = self
            .scenarios
            .read()
            .await
            .iter()
            .filter(|s| s.experiment_id == experiment_id && s.visible)
            .cloned()
            .collect();
        // Stable sort keeps insertion order between equal indices.
        scenarios.sort_by_key(|s| s.sort_index);
        scenarios.truncate(limit);
        Ok(scenarios)
    }

    async fn first_visible_prompt_variant(
        &self,
        experiment_id: &str,
    ) -> PromptLabResult<Option<PromptVariant>> {
        Ok(self
            .variants
            .read()
            .await
            .iter()
            .filter(|v| v.experiment_id == experiment_id && v.visible)
            .min_by_key(|v| v.sort_index)
            .cloned())
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn get_organization(&self, id: &str) -> PromptLabResult<Option<Organization>> {
        Ok(self.organizations.read().await.get(id).cloned())
    }

    async fn update_organization(&self, update: OrganizationUpdate) -> PromptLabResult<Organization> {
        let mut organizations = self.organizations.write().await;
        let organization = organizations
            .get_mut(&update.id)
            .ok_or_else(|| PromptLabError::not_found("Organization", &update.id))?;

        if let Some(name) = update.updates.name {
            if name.trim().is_empty() {
                return Err(PromptLabError::InvalidInput {
                    field: "name".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
            organization.name = name;
        }

        Ok(organization.clone())
    }
}
