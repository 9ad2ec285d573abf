//! Tree Editor Session
//!
//! Owns the node list of one project together with dirty tracking,
//! selection and save state. Everything here is synchronous; the async
//! backend calls live in `operations`.

use std::collections::{BTreeSet, HashMap, HashSet};

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::{BillingType, ComputedValues, InheritFields, NewNodeFields, NodeFields, StructureNode};
use crate::tree::{self, build_tree, flatten_tree, flatten_visible};

/// A local edit of one node field
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    SetNameShort(String),
    SetNameLong(String),
    SetStoredRevenue(Decimal),
    SetBillingType(BillingType),
    SetExtrasPercent(Decimal),
    SetRevenueCompletion(Decimal),
    SetExtrasCompletion(Decimal),
}

fn clamp_percent(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// True when the fields that price a node differ
fn pricing_changed(a: &NodeFields, b: &NodeFields) -> bool {
    a.billing_type_id != b.billing_type_id
        || a.stored_revenue != b.stored_revenue
        || a.extras_percent != b.extras_percent
}

/// Apply one edit to a node, returning the edited copy.
///
/// Revenue is read-only on interior nodes and on `Fixed` nodes. Switching
/// the billing type never touches `stored_revenue`. A pricing edit drops the
/// backend's extras so they are recomputed locally.
pub fn transition(node: &StructureNode, event: NodeEvent) -> Result<StructureNode, ValidationError> {
    let mut next = node.clone();
    match event {
        NodeEvent::SetNameShort(name) => next.name_short = name,
        NodeEvent::SetNameLong(name) => next.name_long = name,
        NodeEvent::SetStoredRevenue(value) => {
            if node.aggregate.has_children || node.billing_type_id.is_fixed() {
                return Err(ValidationError::ReadOnlyRevenue(node.id));
            }
            next.stored_revenue = value;
        }
        NodeEvent::SetBillingType(billing) => next.billing_type_id = billing,
        NodeEvent::SetExtrasPercent(percent) => next.extras_percent = percent.max(Decimal::ZERO),
        NodeEvent::SetRevenueCompletion(percent) => next.revenue_completion_percent = clamp_percent(percent),
        NodeEvent::SetExtrasCompletion(percent) => next.extras_completion_percent = clamp_percent(percent),
    }
    if pricing_changed(&node.fields(), &next.fields()) {
        next.extras = None;
    }
    Ok(next)
}

fn lacks_time_booking_total(node: &StructureNode) -> bool {
    node.billing_type_id.is_fixed() && !node.aggregate.has_children && node.time_booking_total.is_none()
}

/// Form state for a node that does not exist yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDraft {
    pub parent_id: Option<u32>,
    pub name_short: String,
    pub name_long: String,
    pub billing_type_id: Option<BillingType>,
    pub stored_revenue: Decimal,
    pub extras_percent: Decimal,
}

impl NodeDraft {
    pub fn validate(&self) -> Result<NewNodeFields, ValidationError> {
        let name_short = self.name_short.trim();
        if name_short.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let billing_type_id = self.billing_type_id.ok_or(ValidationError::MissingBillingType)?;
        Ok(NewNodeFields {
            parent_id: self.parent_id,
            name_short: name_short.to_string(),
            name_long: self.name_long.trim().to_string(),
            billing_type_id,
            stored_revenue: self.stored_revenue,
            extras_percent: self.extras_percent,
        })
    }
}

/// Everything a table row needs to render, derived from the session
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub node: StructureNode,
    pub depth: usize,
    pub dirty: bool,
    pub selected: bool,
    pub saving: bool,
    pub collapsed: bool,
    pub revenue_readonly: bool,
}

/// Editing state of one project's structure
#[derive(Debug, Clone, Default)]
pub struct TreeEditorSession {
    project_id: u32,
    nodes: Vec<StructureNode>,
    /// Field values as last confirmed by the backend
    saved: HashMap<u32, NodeFields>,
    /// In the order the ids were first marked dirty
    dirty_ids: Vec<u32>,
    selected_ids: BTreeSet<u32>,
    saving_ids: HashSet<u32>,
    collapsed_ids: HashSet<u32>,
}

impl TreeEditorSession {
    pub fn new(project_id: u32) -> Self {
        Self {
            project_id,
            ..Default::default()
        }
    }

    pub fn project_id(&self) -> u32 {
        self.project_id
    }

    pub fn nodes(&self) -> &[StructureNode] {
        &self.nodes
    }

    pub fn node(&self, id: u32) -> Option<&StructureNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn node_mut(&mut self, id: u32) -> Option<&mut StructureNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    fn recompute(&mut self) {
        tree::compute_aggregates(&mut self.nodes);
    }

    /// Replace the whole node list with a fresh backend payload.
    ///
    /// Unsaved edits of nodes that still exist are laid over the new values
    /// and stay dirty; state for vanished ids is dropped.
    pub fn replace_nodes(&mut self, fresh: Vec<StructureNode>) {
        let mut pending: HashMap<u32, NodeFields> = HashMap::new();
        let mut cached_totals: HashMap<u32, Decimal> = HashMap::new();
        for node in &self.nodes {
            if self.dirty_ids.contains(&node.id) {
                pending.insert(node.id, node.fields());
            }
            if let Some(total) = node.time_booking_total {
                cached_totals.insert(node.id, total);
            }
        }

        self.nodes = fresh;
        self.saved = self.nodes.iter().map(|n| (n.id, n.fields())).collect();
        for node in &mut self.nodes {
            if node.time_booking_total.is_none() {
                node.time_booking_total = cached_totals.get(&node.id).copied();
            }
            if let Some(fields) = pending.get(&node.id) {
                node.set_fields(fields);
            }
        }

        let present: HashSet<u32> = self.nodes.iter().map(|n| n.id).collect();
        self.dirty_ids.retain(|id| present.contains(id));
        self.selected_ids.retain(|id| present.contains(id));
        self.saving_ids.retain(|id| present.contains(id));
        self.collapsed_ids.retain(|id| present.contains(id));
        self.recompute();
    }

    // ========================
    // Local Edits
    // ========================

    /// Apply a field edit; a change marks the node dirty
    pub fn apply(&mut self, id: u32, event: NodeEvent) -> Result<(), ValidationError> {
        let node = self.node(id).ok_or(ValidationError::UnknownNode(id))?;
        let next = transition(node, event)?;
        if &next == node {
            return Ok(());
        }
        if let Some(slot) = self.node_mut(id) {
            *slot = next;
        }
        self.mark_dirty(id);
        self.recompute();
        Ok(())
    }

    fn mark_dirty(&mut self, id: u32) {
        if !self.dirty_ids.contains(&id) {
            self.dirty_ids.push(id);
        }
    }

    pub fn is_dirty(&self, id: u32) -> bool {
        self.dirty_ids.contains(&id)
    }

    pub fn dirty_ids(&self) -> &[u32] {
        &self.dirty_ids
    }

    /// "Alle speichern" is enabled iff something is dirty
    pub fn can_save_all(&self) -> bool {
        !self.dirty_ids.is_empty()
    }

    /// True when a `Fixed` leaf has no time-booking total cached yet
    pub fn needs_time_booking_total(&self, id: u32) -> bool {
        self.node(id).map(lacks_time_booking_total).unwrap_or(false)
    }

    /// Every `Fixed` leaf whose revenue is still unknown, in id order
    pub fn missing_time_booking_totals(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .nodes
            .iter()
            .filter(|n| lacks_time_booking_total(n))
            .map(|n| n.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn set_time_booking_total(&mut self, id: u32, total: Decimal) {
        if let Some(node) = self.node_mut(id) {
            node.time_booking_total = Some(total);
        }
        self.recompute();
    }

    /// Apply billing type and/or extras percent to every target, locally only
    pub fn bulk_apply(
        &mut self,
        targets: &[u32],
        billing: Option<BillingType>,
        extras_percent: Option<Decimal>,
    ) -> Result<usize, ValidationError> {
        if targets.is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        if billing.is_none() && extras_percent.is_none() {
            return Err(ValidationError::NothingToApply);
        }
        let mut touched = 0;
        for id in targets {
            let Some(node) = self.node_mut(*id) else {
                continue;
            };
            let before = node.fields();
            if let Some(billing) = billing {
                node.billing_type_id = billing;
            }
            if let Some(percent) = extras_percent {
                node.extras_percent = percent.max(Decimal::ZERO);
            }
            if pricing_changed(&before, &node.fields()) {
                node.extras = None;
            }
            self.mark_dirty(*id);
            touched += 1;
        }
        self.recompute();
        Ok(touched)
    }

    // ========================
    // Save Lifecycle
    // ========================

    pub fn is_saving(&self, id: u32) -> bool {
        self.saving_ids.contains(&id)
    }

    /// Validate a node and mark it as saving. Returns the fields to send.
    pub fn begin_save(&mut self, id: u32) -> Result<NodeFields, ValidationError> {
        let node = self.node(id).ok_or(ValidationError::UnknownNode(id))?;
        if self.saving_ids.contains(&id) {
            return Err(ValidationError::SaveInProgress(id));
        }
        if node.name_short.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        let fields = node.fields();
        self.saving_ids.insert(id);
        Ok(fields)
    }

    /// Fold the backend's answer for `sent` back into the node.
    ///
    /// Edits made while the request was in flight are kept: the node stays
    /// dirty and its local pricing wins over the server's computed values.
    /// Returns the fields worth propagating to descendants, if the node has
    /// any and its billing type or extras percent changed since the last save.
    pub fn finish_save(&mut self, id: u32, sent: &NodeFields, computed: ComputedValues) -> Option<InheritFields> {
        self.saving_ids.remove(&id);

        let node = self.node_mut(id)?;
        let edited_meanwhile = node.fields() != *sent;
        let repriced = pricing_changed(&node.fields(), sent);
        let has_children = node.aggregate.has_children;
        if !has_children && sent.billing_type_id.is_fixed() {
            node.time_booking_total = Some(computed.revenue);
        } else if !has_children && !repriced {
            node.stored_revenue = computed.revenue;
        }
        node.extras = if repriced { None } else { computed.extras };
        let snapshot = if edited_meanwhile { sent.clone() } else { node.fields() };

        if !edited_meanwhile {
            self.dirty_ids.retain(|d| *d != id);
        }
        let previous = self.saved.insert(id, snapshot);
        self.recompute();

        if !has_children {
            return None;
        }
        let previous = previous?;
        let prompt = InheritFields {
            billing_type_id: (previous.billing_type_id != sent.billing_type_id).then_some(sent.billing_type_id),
            extras_percent: (previous.extras_percent != sent.extras_percent).then_some(sent.extras_percent),
        };
        (!prompt.is_empty()).then_some(prompt)
    }

    /// The save failed; the node stays dirty
    pub fn abort_save(&mut self, id: u32) {
        self.saving_ids.remove(&id);
    }

    // ========================
    // Selection
    // ========================

    pub fn toggle_selected(&mut self, id: u32) {
        if !self.selected_ids.remove(&id) {
            self.selected_ids.insert(id);
        }
    }

    pub fn select_all(&mut self) {
        self.selected_ids = self.nodes.iter().map(|n| n.id).collect();
    }

    pub fn select_none(&mut self) {
        self.selected_ids.clear();
    }

    pub fn is_selected(&self, id: u32) -> bool {
        self.selected_ids.contains(&id)
    }

    pub fn selected_ids(&self) -> Vec<u32> {
        self.selected_ids.iter().copied().collect()
    }

    /// Ids a context action applies to: the selection, else the clicked node
    pub fn targets(&self, context_id: Option<u32>) -> Vec<u32> {
        if self.selected_ids.is_empty() {
            context_id.into_iter().collect()
        } else {
            self.selected_ids()
        }
    }

    // ========================
    // Display
    // ========================

    pub fn toggle_collapsed(&mut self, id: u32) {
        if !self.collapsed_ids.remove(&id) {
            self.collapsed_ids.insert(id);
        }
    }

    pub fn is_collapsed(&self, id: u32) -> bool {
        self.collapsed_ids.contains(&id)
    }

    /// Visible rows in display order with their derived visual state
    pub fn rows(&self) -> Vec<RowView> {
        let roots = build_tree(&self.nodes);
        flatten_visible(&roots, &self.collapsed_ids)
            .map(|(node, depth)| RowView {
                node: node.clone(),
                depth,
                dirty: self.is_dirty(node.id),
                selected: self.is_selected(node.id),
                saving: self.is_saving(node.id),
                collapsed: self.is_collapsed(node.id),
                revenue_readonly: node.aggregate.has_children || node.billing_type_id.is_fixed(),
            })
            .collect()
    }

    /// All nodes in tree order, ignoring collapse state
    pub fn nodes_in_display_order(&self) -> Vec<StructureNode> {
        let roots = build_tree(&self.nodes);
        flatten_tree(&roots).map(|(node, _)| node.clone()).collect()
    }

    /// Revenue of the whole project: sum over the displayed roots
    pub fn total_revenue(&self) -> Decimal {
        build_tree(&self.nodes)
            .iter()
            .map(|root| root.node.aggregate.computed_revenue)
            .sum()
    }

    /// New-node form pre-filled from the parent's billing type and extras
    pub fn draft_under(&self, parent_id: Option<u32>) -> NodeDraft {
        let parent = parent_id.and_then(|id| self.node(id));
        NodeDraft {
            parent_id: parent.map(|p| p.id),
            billing_type_id: parent.map(|p| p.billing_type_id),
            extras_percent: parent.map(|p| p.extras_percent).unwrap_or_default(),
            ..Default::default()
        }
    }
}
