//! Selection state and the transitions that mutate it.
//!
//! [`reduce`] is a pure function over `(state, action, catalog)`; the
//! [`ConfigurationManager`] owns the single live [`SelectionState`] and
//! routes every mutation through it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{AddedParts, Catalog, ConfigError, PartType, Server, ServerId, Snapshot};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub selected_server_id: Option<ServerId>,
    pub added_parts: AddedParts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectServer(ServerId),
    AddPart(PartType),
    RemovePart(PartType),
}

/// Result of applying one action. On rejection `state` equals the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SelectionState,
    pub outcome: Result<(), ConfigError>,
}

impl Transition {
    fn accepted(state: SelectionState) -> Self {
        Self {
            state,
            outcome: Ok(()),
        }
    }

    fn rejected(state: &SelectionState, err: ConfigError) -> Self {
        Self {
            state: *state,
            outcome: Err(err),
        }
    }
}

pub fn reduce(state: &SelectionState, action: Action, catalog: &Catalog) -> Transition {
    match action {
        Action::SelectServer(id) => {
            if catalog.server(id).is_none() {
                return Transition::rejected(state, ConfigError::UnknownServer(id));
            }
            Transition::accepted(SelectionState {
                selected_server_id: Some(id),
                added_parts: AddedParts::default(),
            })
        }
        Action::AddPart(part) => {
            let Some(server) = state.selected_server_id.and_then(|id| catalog.server(id)) else {
                return Transition::rejected(state, ConfigError::NoServerSelected);
            };
            let limit = catalog.limit(server, part);
            if state.added_parts.get(part) >= limit {
                return Transition::rejected(state, ConfigError::LimitReached { part, limit });
            }
            let mut next = *state;
            *next.added_parts.get_mut(part) += 1;
            Transition::accepted(next)
        }
        Action::RemovePart(part) => {
            if state.added_parts.get(part) == 0 {
                return Transition::rejected(state, ConfigError::NothingToRemove(part));
            }
            let mut next = *state;
            *next.added_parts.get_mut(part) -= 1;
            Transition::accepted(next)
        }
    }
}

/// Owns the catalog and the one mutable selection record.
#[derive(Debug, Clone)]
pub struct ConfigurationManager {
    catalog: Arc<Catalog>,
    state: SelectionState,
}

impl ConfigurationManager {
    pub fn new(catalog: impl Into<Arc<Catalog>>) -> Self {
        Self {
            catalog: catalog.into(),
            state: SelectionState::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn added_parts(&self) -> AddedParts {
        self.state.added_parts
    }

    pub fn selected_server(&self) -> Option<&Server> {
        self.state
            .selected_server_id
            .and_then(|id| self.catalog.server(id))
    }

    pub fn apply(&mut self, action: Action) -> Result<(), ConfigError> {
        let transition = reduce(&self.state, action, &self.catalog);
        match &transition.outcome {
            Ok(()) => tracing::debug!(?action, parts = ?transition.state.added_parts, "action applied"),
            Err(e) => tracing::warn!(?action, reason = %e, "action rejected"),
        }
        self.state = transition.state;
        transition.outcome
    }

    /// Select a server and clear every part count.
    pub fn select_server(&mut self, id: ServerId) -> Result<&Server, ConfigError> {
        self.apply(Action::SelectServer(id))?;
        let server = self
            .catalog
            .server(id)
            .ok_or(ConfigError::UnknownServer(id))?;
        tracing::info!(server = %server.name, id = %id, "server selected");
        Ok(server)
    }

    /// Add one part of `part`; returns the new count.
    pub fn add_part(&mut self, part: PartType) -> Result<u32, ConfigError> {
        self.apply(Action::AddPart(part))?;
        Ok(self.state.added_parts.get(part))
    }

    /// Remove one part of `part`; returns the new count.
    pub fn remove_part(&mut self, part: PartType) -> Result<u32, ConfigError> {
        self.apply(Action::RemovePart(part))?;
        Ok(self.state.added_parts.get(part))
    }

    /// Immutable copy of the current selection for exporters.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            selected_server_id: self.state.selected_server_id,
            added_parts: self.state.added_parts,
            catalog: Arc::clone(&self.catalog),
        }
    }
}
