//! Metadata endpoint handlers.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use smp_metadata::constants::SAML_METADATA_CONTENT_TYPE;
use smp_metadata::{extract_entity, validate_entity_id, MetadataError};

use crate::error::ApiResult;
use crate::state::AppState;

/// Query parameters of `GET /{federation}`.
#[derive(Debug, Deserialize)]
pub struct EntityQuery {
    /// The requested entity ID.
    #[serde(rename = "entityId")]
    pub entity_id: Option<String>,
}

/// `GET /{federation}?entityId=...`
///
/// Serves one entity descriptor of the federation's aggregate as a
/// standalone metadata document.
pub async fn entity_metadata(
    State(state): State<AppState>,
    Path(federation): Path<String>,
    Query(query): Query<EntityQuery>,
) -> ApiResult<Response> {
    let entity_id = query
        .entity_id
        .ok_or_else(|| MetadataError::InvalidEntityId("missing entityId parameter".into()))?;
    validate_entity_id(&entity_id)?;

    let aggregate = state.provider().get_metadata(&federation).await?;
    let entity = extract_entity(&entity_id, &aggregate)?;

    tracing::debug!(
        federation = %federation,
        entity_id = %entity_id,
        "entity metadata served"
    );
    Ok((
        [(header::CONTENT_TYPE, SAML_METADATA_CONTENT_TYPE)],
        entity.into_xml(),
    )
        .into_response())
}
