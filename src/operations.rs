//! Structure Operations
//!
//! Async mutations of the project structure. Each operation updates the
//! session, issues its backend calls one after another, and folds the
//! answers back into the session.

use std::cell::RefCell;

use leptos::logging::{log, warn};

use crate::api::StructureApi;
use crate::error::{ApiError, OpError, ValidationError};
use crate::models::{InheritFields, StructureNode};
use crate::session::{NodeDraft, TreeEditorSession};
use crate::tree;

/// Lends the session out between suspension points.
///
/// Borrows never span an `.await`.
pub trait SessionCell {
    fn with_session_mut<R>(&self, f: impl FnOnce(&mut TreeEditorSession) -> R) -> R;

    fn with_session<R>(&self, f: impl FnOnce(&TreeEditorSession) -> R) -> R;
}

impl SessionCell for RefCell<TreeEditorSession> {
    fn with_session_mut<R>(&self, f: impl FnOnce(&mut TreeEditorSession) -> R) -> R {
        f(&mut self.borrow_mut())
    }

    fn with_session<R>(&self, f: impl FnOnce(&TreeEditorSession) -> R) -> R {
        f(&self.borrow())
    }
}

/// Result of a successful single save
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SaveOutcome {
    /// Set when the user should be asked to propagate to descendants
    pub inherit: Option<InheritFields>,
}

/// Outcome of a batch: every item was attempted
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    pub succeeded: Vec<u32>,
    pub failed: Vec<(u32, String)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.failed.is_empty() {
            return format!("{} Element(e) erfolgreich verarbeitet.", self.succeeded.len());
        }
        let details: Vec<String> = self
            .failed
            .iter()
            .map(|(id, reason)| format!("#{}: {}", id, reason))
            .collect();
        format!(
            "{} erfolgreich, {} fehlgeschlagen – {}",
            self.succeeded.len(),
            self.failed.len(),
            details.join("; ")
        )
    }
}

// ========================
// Loading
// ========================

/// Fetch the structure and replace the session's node list.
///
/// Afterwards the time-booking total of every `Fixed` leaf the payload left
/// out is fetched, one after another. Those failures are logged only; the
/// leaf keeps counting as zero until a later load succeeds.
pub async fn reload<A: StructureApi, S: SessionCell>(api: &A, cell: &S) -> Result<usize, ApiError> {
    let project_id = cell.with_session(|s| s.project_id());
    let nodes = api.list_structure(project_id).await?;
    let count = nodes.len();
    log!("[STRUCTURE] Loaded {} nodes for project {}", count, project_id);
    cell.with_session_mut(|s| s.replace_nodes(nodes));

    let missing = cell.with_session(|s| s.missing_time_booking_totals());
    for node_id in missing {
        match api.time_booking_sum(node_id).await {
            Ok(sum) => cell.with_session_mut(|s| s.set_time_booking_total(node_id, sum)),
            Err(err) => warn!("[STRUCTURE] Time-booking total of node {} unavailable: {}", node_id, err),
        }
    }
    Ok(count)
}

/// Fetch the time-booking total of a node unless it is already known
pub async fn ensure_time_booking_total<A: StructureApi, S: SessionCell>(
    api: &A,
    cell: &S,
    node_id: u32,
) -> Result<(), ApiError> {
    if !cell.with_session(|s| s.needs_time_booking_total(node_id)) {
        return Ok(());
    }
    let sum = api.time_booking_sum(node_id).await?;
    cell.with_session_mut(|s| s.set_time_booking_total(node_id, sum));
    Ok(())
}

// ========================
// Saving
// ========================

/// Persist one dirty node and adopt the server's computed values
pub async fn save_node<A: StructureApi, S: SessionCell>(
    api: &A,
    cell: &S,
    node_id: u32,
) -> Result<SaveOutcome, OpError> {
    let fields = cell.with_session_mut(|s| s.begin_save(node_id))?;
    match api.update_node(node_id, &fields).await {
        Ok(computed) => {
            let inherit = cell.with_session_mut(|s| s.finish_save(node_id, &fields, computed));
            if cell.with_session(|s| s.is_dirty(node_id)) {
                log!("[STRUCTURE] Node {} was edited during its save and stays dirty", node_id);
            }
            Ok(SaveOutcome { inherit })
        }
        Err(err) => {
            warn!("[STRUCTURE] Saving node {} failed: {}", node_id, err);
            cell.with_session_mut(|s| s.abort_save(node_id));
            Err(err.into())
        }
    }
}

/// Propagate billing type and/or extras percent to the subtree, then reload
pub async fn inherit_to_descendants<A: StructureApi, S: SessionCell>(
    api: &A,
    cell: &S,
    node_id: u32,
    fields: InheritFields,
) -> Result<(), OpError> {
    if fields.is_empty() {
        return Err(ValidationError::NothingToApply.into());
    }
    api.inherit(node_id, &fields).await?;
    reload(api, cell).await?;
    Ok(())
}

/// Save every dirty node in the order it became dirty.
///
/// `progress` is called as `(index, total, node_id)` before each save.
pub async fn save_all<A, S, P>(api: &A, cell: &S, mut progress: P) -> BatchReport
where
    A: StructureApi,
    S: SessionCell,
    P: FnMut(usize, usize, u32),
{
    let pending: Vec<u32> = cell.with_session(|s| s.dirty_ids().to_vec());
    let total = pending.len();
    let mut report = BatchReport::default();
    for (i, node_id) in pending.into_iter().enumerate() {
        progress(i + 1, total, node_id);
        match save_node(api, cell, node_id).await {
            Ok(_) => report.succeeded.push(node_id),
            Err(err) => report.failed.push((node_id, err.to_string())),
        }
    }
    report
}

// ========================
// Structure Changes
// ========================

/// Reparent a node; `None` moves it to the root level.
///
/// Returns `false` when the move was a no-op.
pub async fn move_node<A: StructureApi, S: SessionCell>(
    api: &A,
    cell: &S,
    node_id: u32,
    new_parent_id: Option<u32>,
) -> Result<bool, OpError> {
    if new_parent_id == Some(node_id) {
        return Ok(false);
    }
    cell.with_session(|s| {
        if s.node(node_id).is_none() {
            return Err(ValidationError::UnknownNode(node_id));
        }
        match new_parent_id {
            Some(target) if tree::is_descendant(s.nodes(), node_id, target) => {
                Err(ValidationError::MoveIntoDescendant { node: node_id, target })
            }
            _ => Ok(()),
        }
    })?;
    api.move_node(node_id, new_parent_id).await?;
    log!("[STRUCTURE] Moved node {} under {:?}", node_id, new_parent_id);
    reload(api, cell).await?;
    Ok(true)
}

/// Delete one node, optionally with its descendants, then reload
pub async fn delete_node<A: StructureApi, S: SessionCell>(
    api: &A,
    cell: &S,
    node_id: u32,
    cascade: bool,
) -> Result<(), OpError> {
    api.delete_node(node_id, cascade).await?;
    reload(api, cell).await?;
    Ok(())
}

/// Delete several nodes children-first, continuing past failures
pub async fn delete_many<A: StructureApi, S: SessionCell>(
    api: &A,
    cell: &S,
    ids: &[u32],
    cascade: bool,
) -> Result<BatchReport, OpError> {
    if ids.is_empty() {
        return Err(ValidationError::EmptySelection.into());
    }
    let order = cell.with_session(|s| tree::deletion_order(s.nodes(), ids));
    let mut report = BatchReport::default();
    for node_id in order {
        match api.delete_node(node_id, cascade).await {
            Ok(()) => report.succeeded.push(node_id),
            Err(err) => {
                warn!("[STRUCTURE] Deleting node {} failed: {}", node_id, err);
                report.failed.push((node_id, err.to_string()));
            }
        }
    }
    if let Err(err) = reload(api, cell).await {
        warn!("[STRUCTURE] Reload after delete failed: {}", err);
    }
    Ok(report)
}

/// Create a node from a validated draft, then reload
pub async fn create_node<A: StructureApi, S: SessionCell>(
    api: &A,
    cell: &S,
    draft: &NodeDraft,
) -> Result<StructureNode, OpError> {
    let fields = draft.validate()?;
    let project_id = cell.with_session(|s| s.project_id());
    let created = api.create_node(project_id, &fields).await?;
    log!("[STRUCTURE] Created node {} ({})", created.id, created.name_short);
    reload(api, cell).await?;
    Ok(created)
}
