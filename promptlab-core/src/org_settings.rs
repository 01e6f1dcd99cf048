//! Organization settings page state
//!
//! Local draft of the organization name plus the view model the page renders
//! inside the navigation shell. Performs no I/O; the async controller decides
//! whether to call the update API from `pending_update`.

use crate::models::{Organization, OrganizationUpdate, OrganizationUpdates};
use serde::Serialize;

pub const PAGE_TITLE: &str = "Home";

#[derive(Debug, Clone, Default)]
pub struct OrgNameDraft {
    selected: Option<Organization>,
    name: Option<String>,
}

impl OrgNameDraft {
    pub fn new(selected: Option<Organization>) -> Self {
        let name = selected.as_ref().map(|org| org.name.clone());
        Self { selected, name }
    }

    /// Feed the latest externally loaded organization.
    ///
    /// The draft is reset only when the observed name differs from the last
    /// observed one, so a refetch that returns the same name keeps user edits.
    pub fn observe(&mut self, selected: Option<Organization>) {
        let previous = self.selected.as_ref().map(|org| org.name.clone());
        let observed = selected.as_ref().map(|org| org.name.clone());
        if previous != observed {
            self.name = observed;
        }
        self.selected = selected;
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn selected(&self) -> Option<&Organization> {
        self.selected.as_ref()
    }

    /// The update to send, if saving now would change anything
    pub fn pending_update(&self) -> Option<OrganizationUpdate> {
        let name = self.name.as_deref().filter(|name| !name.is_empty())?;
        let selected = self.selected.as_ref().filter(|org| !org.id.is_empty())?;
        if name == selected.name {
            return None;
        }

        Some(OrganizationUpdate {
            id: selected.id.clone(),
            updates: OrganizationUpdates {
                name: Some(name.to_string()),
            },
        })
    }

    pub fn view(&self, project_name: &str) -> OrgSettingsView {
        OrgSettingsView {
            breadcrumbs: vec![
                Breadcrumb {
                    label: project_name.to_string(),
                    current: false,
                },
                Breadcrumb {
                    label: PAGE_TITLE.to_string(),
                    current: true,
                },
            ],
            name: self.name.clone().unwrap_or_default(),
            save_enabled: self.pending_update().is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    pub current: bool,
}

/// What the settings page renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgSettingsView {
    pub breadcrumbs: Vec<Breadcrumb>,
    pub name: String,
    pub save_enabled: bool,
}
