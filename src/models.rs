//! Frontend Models
//!
//! Typed records for the project structure, matching the backend JSON.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Revenue policy of a structure node.
///
/// Sent and received as the backend's numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum BillingType {
    /// Revenue is entered manually (id 1)
    StoredRevenue,
    /// Revenue is pinned to the time-booking total (id 2)
    Fixed,
    /// Any other id the backend knows about; treated like `StoredRevenue`
    Other(u8),
}

impl BillingType {
    pub fn id(self) -> u8 {
        match self {
            BillingType::StoredRevenue => 1,
            BillingType::Fixed => 2,
            BillingType::Other(id) => id,
        }
    }

    pub fn is_fixed(self) -> bool {
        self == BillingType::Fixed
    }

    pub fn label(self) -> String {
        match self {
            BillingType::StoredRevenue => "Honorar".to_string(),
            BillingType::Fixed => "Aufwand".to_string(),
            BillingType::Other(id) => format!("Typ {}", id),
        }
    }
}

impl From<u8> for BillingType {
    fn from(id: u8) -> Self {
        match id {
            1 => BillingType::StoredRevenue,
            2 => BillingType::Fixed,
            other => BillingType::Other(other),
        }
    }
}

impl From<BillingType> for u8 {
    fn from(value: BillingType) -> Self {
        value.id()
    }
}

/// Values derived from the tree, recomputed after every change
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aggregate {
    pub has_children: bool,
    /// Own revenue for leaves, sum of children otherwise
    pub computed_revenue: Decimal,
    /// Extras as shown while editing the structure
    pub computed_extras: Decimal,
    /// Extras used for progress tracking (always revenue * percent)
    pub completion_extras: Decimal,
    pub earned_revenue: Decimal,
    pub earned_extras: Decimal,
}

/// One node of a project's work-breakdown structure (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureNode {
    pub id: u32,
    #[serde(default)]
    pub parent_id: Option<u32>,
    pub name_short: String,
    #[serde(default)]
    pub name_long: String,
    pub billing_type_id: BillingType,
    #[serde(default)]
    pub stored_revenue: Decimal,
    /// Absent when the backend did not include it; fetch via tec-sum
    #[serde(default)]
    pub time_booking_total: Option<Decimal>,
    /// Backend-computed extras for at-rest editing
    #[serde(default)]
    pub extras: Option<Decimal>,
    #[serde(default)]
    pub extras_percent: Decimal,
    #[serde(default)]
    pub revenue_completion_percent: Decimal,
    #[serde(default)]
    pub extras_completion_percent: Decimal,
    #[serde(skip)]
    pub aggregate: Aggregate,
}

impl StructureNode {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Field set sent to the backend on save
    pub fn fields(&self) -> NodeFields {
        NodeFields {
            name_short: self.name_short.clone(),
            name_long: self.name_long.clone(),
            billing_type_id: self.billing_type_id,
            stored_revenue: self.stored_revenue,
            extras_percent: self.extras_percent,
            revenue_completion_percent: self.revenue_completion_percent,
            extras_completion_percent: self.extras_completion_percent,
        }
    }

    /// Overwrite the editable fields with a pending local edit
    pub fn set_fields(&mut self, fields: &NodeFields) {
        self.name_short = fields.name_short.clone();
        self.name_long = fields.name_long.clone();
        self.billing_type_id = fields.billing_type_id;
        self.stored_revenue = fields.stored_revenue;
        self.extras_percent = fields.extras_percent;
        self.revenue_completion_percent = fields.revenue_completion_percent;
        self.extras_completion_percent = fields.extras_completion_percent;
    }
}

// ========================
// Request Bodies
// ========================

/// Full editable field set of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFields {
    pub name_short: String,
    pub name_long: String,
    pub billing_type_id: BillingType,
    pub stored_revenue: Decimal,
    pub extras_percent: Decimal,
    pub revenue_completion_percent: Decimal,
    pub extras_completion_percent: Decimal,
}

/// Body for creating a node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNodeFields {
    pub parent_id: Option<u32>,
    pub name_short: String,
    pub name_long: String,
    pub billing_type_id: BillingType,
    pub stored_revenue: Decimal,
    pub extras_percent: Decimal,
}

/// Fields propagated from a node to all of its descendants
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InheritFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_type_id: Option<BillingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras_percent: Option<Decimal>,
}

impl InheritFields {
    pub fn is_empty(&self) -> bool {
        self.billing_type_id.is_none() && self.extras_percent.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub node_id: u32,
    pub new_parent_id: Option<u32>,
}

// ========================
// Responses
// ========================

/// Server-side computed values returned after a save
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputedValues {
    pub revenue: Decimal,
    #[serde(default)]
    pub extras: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub computed: ComputedValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TecSum {
    pub sum: Decimal,
}

/// Error body returned by the backend on rejection
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BackendError {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl BackendError {
    pub fn text(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_node_from_backend_json() {
        let json = r#"{
            "id": 7,
            "parentId": 3,
            "nameShort": "LP 2",
            "billingTypeId": 2,
            "storedRevenue": 1200.5,
            "extrasPercent": 5
        }"#;
        let node: StructureNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.id, 7);
        assert_eq!(node.parent_id, Some(3));
        assert_eq!(node.billing_type_id, BillingType::Fixed);
        assert_eq!(node.name_long, "");
        assert_eq!(node.stored_revenue, dec!(1200.5));
        assert_eq!(node.extras_percent, dec!(5));
        assert_eq!(node.time_booking_total, None);
        assert_eq!(node.aggregate, Aggregate::default());
    }

    #[test]
    fn test_unknown_billing_type_is_kept() {
        let node: StructureNode =
            serde_json::from_str(r#"{"id":1,"nameShort":"A","billingTypeId":4}"#).unwrap();
        assert_eq!(node.billing_type_id, BillingType::Other(4));
        let out = serde_json::to_value(node.fields()).unwrap();
        assert_eq!(out["billingTypeId"], 4);
    }

    #[test]
    fn test_inherit_fields_skip_missing() {
        let fields = InheritFields { billing_type_id: None, extras_percent: Some(dec!(8.0)) };
        let out = serde_json::to_string(&fields).unwrap();
        assert_eq!(out, r#"{"extrasPercent":8.0}"#);
    }

    #[test]
    fn test_backend_error_text() {
        let err: BackendError = serde_json::from_str(r#"{"message":"Referenziert"}"#).unwrap();
        assert_eq!(err.text(), Some("Referenziert"));
        let empty: BackendError = serde_json::from_str(r#"{"error":"  "}"#).unwrap();
        assert_eq!(empty.text(), None);
    }
}
