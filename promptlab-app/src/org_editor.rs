//! Organization Name Editor
//!
//! Drives the settings page: keeps the draft in sync with the loaded
//! organization, sends the rename, and announces the change so cached
//! organization reads refetch. The known name is not updated optimistically.

use crate::errors::{ErrorResponse, PromptLabResult};
use crate::events::{EntityChanged, InvalidationBus};
use crate::store::OrganizationStore;
use promptlab_core::{OrgNameDraft, OrgSettingsView, Organization};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Name was empty, unchanged, or no organization is loaded
    Skipped,
    Saved(Organization),
}

pub struct OrgNameEditor {
    draft: OrgNameDraft,
    api: Arc<dyn OrganizationStore>,
    events: InvalidationBus,
}

impl OrgNameEditor {
    pub fn new(
        selected: Option<Organization>,
        api: Arc<dyn OrganizationStore>,
        events: InvalidationBus,
    ) -> Self {
        Self {
            draft: OrgNameDraft::new(selected),
            api,
            events,
        }
    }

    /// Feed the latest loaded organization (e.g. after a refetch)
    pub fn observe(&mut self, selected: Option<Organization>) {
        self.draft.observe(selected);
    }

    pub fn set_name(&mut self, name: &str) {
        self.draft.set_name(name);
    }

    pub fn name(&self) -> Option<&str> {
        self.draft.name()
    }

    pub fn view(&self, project_name: &str) -> OrgSettingsView {
        self.draft.view(project_name)
    }

    pub async fn save(&self) -> PromptLabResult<SaveOutcome> {
        let Some(update) = self.draft.pending_update() else {
            return Ok(SaveOutcome::Skipped);
        };

        let id = update.id.clone();
        let saved = self.api.update_organization(update).await?;
        info!(organization_id = %id, "organization renamed");

        self.events.publish(EntityChanged::Organization { id });
        Ok(SaveOutcome::Saved(saved))
    }

    /// `save` routed through the shared async error handler
    pub async fn save_handled(&self) -> Result<SaveOutcome, ErrorResponse> {
        handled_async(self.save()).await
    }
}

/// Log a failed UI action and turn its error into a frontend response
pub async fn handled_async<T, F>(action: F) -> Result<T, ErrorResponse>
where
    F: Future<Output = PromptLabResult<T>>,
{
    action.await.map_err(|err| {
        error!(code = err.code(), "{}", err);
        ErrorResponse::from(err)
    })
}
