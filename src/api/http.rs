//! HTTP Structure API
//!
//! `StructureApi` over JSON/HTTP using gloo-net.

use gloo_net::http::{Request, Response};
use rust_decimal::Decimal;

use super::StructureApi;
use crate::error::ApiError;
use crate::models::{
    BackendError, ComputedValues, InheritFields, MoveRequest, NewNodeFields, NodeFields, SaveResponse,
    StructureNode, TecSum,
};

#[derive(Debug, Clone, PartialEq)]
pub struct HttpStructureApi {
    base: String,
}

impl HttpStructureApi {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn project_url(&self, project_id: u32) -> String {
        format!("{}/projects/{}/structure", self.base, project_id)
    }

    fn node_url(&self, node_id: u32) -> String {
        format!("{}/structure/{}", self.base, node_id)
    }
}

// ========================
// Response Handling
// ========================

/// Turn a rejected response body into an `ApiError`
pub(crate) fn error_from_body(status: u16, body: &str) -> ApiError {
    let text = serde_json::from_str::<BackendError>(body)
        .ok()
        .and_then(|err| err.text().map(str::to_string));
    match (status, text) {
        (409, Some(message)) => ApiError::BlockedByReferences(message),
        (409, None) => ApiError::BlockedByReferences(
            "Das Element wird noch verwendet und kann nicht gelöscht werden.".to_string(),
        ),
        (status, Some(message)) => ApiError::Backend { status, message },
        (status, None) => ApiError::fallback(status),
    }
}

async fn check(response: Response) -> Result<Response, ApiError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(error_from_body(status, &body))
}

fn network(err: gloo_net::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

fn decode(err: gloo_net::Error) -> ApiError {
    ApiError::Decode(err.to_string())
}

// ========================
// Endpoints
// ========================

impl StructureApi for HttpStructureApi {
    async fn list_structure(&self, project_id: u32) -> Result<Vec<StructureNode>, ApiError> {
        let response = Request::get(&self.project_url(project_id))
            .send()
            .await
            .map_err(network)?;
        check(response).await?.json().await.map_err(decode)
    }

    async fn create_node(&self, project_id: u32, fields: &NewNodeFields) -> Result<StructureNode, ApiError> {
        let response = Request::post(&self.project_url(project_id))
            .json(fields)
            .map_err(decode)?
            .send()
            .await
            .map_err(network)?;
        check(response).await?.json().await.map_err(decode)
    }

    async fn update_node(&self, node_id: u32, fields: &NodeFields) -> Result<ComputedValues, ApiError> {
        let response = Request::patch(&self.node_url(node_id))
            .json(fields)
            .map_err(decode)?
            .send()
            .await
            .map_err(network)?;
        let saved: SaveResponse = check(response).await?.json().await.map_err(decode)?;
        Ok(saved.computed)
    }

    async fn inherit(&self, node_id: u32, fields: &InheritFields) -> Result<(), ApiError> {
        let url = format!("{}/inherit", self.node_url(node_id));
        let response = Request::patch(&url)
            .json(fields)
            .map_err(decode)?
            .send()
            .await
            .map_err(network)?;
        check(response).await.map(|_| ())
    }

    async fn move_node(&self, node_id: u32, new_parent_id: Option<u32>) -> Result<(), ApiError> {
        let url = format!("{}/move", self.node_url(node_id));
        let response = Request::patch(&url)
            .json(&MoveRequest { node_id, new_parent_id })
            .map_err(decode)?
            .send()
            .await
            .map_err(network)?;
        check(response).await.map(|_| ())
    }

    async fn delete_node(&self, node_id: u32, cascade: bool) -> Result<(), ApiError> {
        let response = Request::delete(&self.node_url(node_id))
            .query([("cascade", if cascade { "true" } else { "false" })])
            .send()
            .await
            .map_err(network)?;
        check(response).await.map(|_| ())
    }

    async fn time_booking_sum(&self, node_id: u32) -> Result<Decimal, ApiError> {
        let url = format!("{}/tec-sum", self.node_url(node_id));
        let response = Request::get(&url).send().await.map_err(network)?;
        let tec: TecSum = check(response).await?.json().await.map_err(decode)?;
        Ok(tec.sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let api = HttpStructureApi::new("https://example.org/api/");
        assert_eq!(api.project_url(4), "https://example.org/api/projects/4/structure");
        assert_eq!(api.node_url(17), "https://example.org/api/structure/17");
    }

    #[test]
    fn test_backend_message_is_kept() {
        let err = error_from_body(422, r#"{"error":"Kurzbezeichnung bereits vergeben"}"#);
        assert_eq!(
            err,
            ApiError::Backend { status: 422, message: "Kurzbezeichnung bereits vergeben".into() }
        );
    }

    #[test]
    fn test_unparsable_body_falls_back() {
        let err = error_from_body(500, "<html>Internal Server Error</html>");
        assert_eq!(err, ApiError::fallback(500));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_conflict_maps_to_blocked() {
        let err = error_from_body(409, r#"{"message":"Noch 3 Buchungen verknüpft"}"#);
        assert_eq!(err, ApiError::BlockedByReferences("Noch 3 Buchungen verknüpft".into()));
        assert!(matches!(error_from_body(409, ""), ApiError::BlockedByReferences(_)));
    }
}
