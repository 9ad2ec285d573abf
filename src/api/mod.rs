//! Backend API
//!
//! The structure endpoints the editor depends on, and their HTTP binding.

mod http;

pub use http::HttpStructureApi;

use rust_decimal::Decimal;

use crate::error::ApiError;
use crate::models::{ComputedValues, InheritFields, NewNodeFields, NodeFields, StructureNode};

/// Backend collaborator for project structures.
///
/// Every method is one request; callers await them one at a time.
#[allow(async_fn_in_trait)]
pub trait StructureApi {
    async fn list_structure(&self, project_id: u32) -> Result<Vec<StructureNode>, ApiError>;

    async fn create_node(&self, project_id: u32, fields: &NewNodeFields) -> Result<StructureNode, ApiError>;

    /// Persist the full field set; the server answers with its computed values
    async fn update_node(&self, node_id: u32, fields: &NodeFields) -> Result<ComputedValues, ApiError>;

    /// Copy billing type and/or extras percent onto the whole subtree
    async fn inherit(&self, node_id: u32, fields: &InheritFields) -> Result<(), ApiError>;

    async fn move_node(&self, node_id: u32, new_parent_id: Option<u32>) -> Result<(), ApiError>;

    async fn delete_node(&self, node_id: u32, cascade: bool) -> Result<(), ApiError>;

    /// Current time-booking total of a node
    async fn time_booking_sum(&self, node_id: u32) -> Result<Decimal, ApiError>;
}
