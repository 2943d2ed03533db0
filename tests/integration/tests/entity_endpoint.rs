//! `GET /{federation}?entityId=` integration tests.

use axum::http::StatusCode;
use chrono::{TimeDelta, Utc};
use smp_metadata::testing::TestSigner;

use crate::common::{signed_aggregate, TestEnv, ENTITY_IDS};

const MD_NS: &str = "urn:oasis:names:tc:SAML:2.0:metadata";

/// Tests that an entity is served as a standalone document.
#[tokio::test]
async fn test_entity_is_served_standalone() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let response = env.get_entity("fed", Some(ENTITY_IDS[0])).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert_eq!(content_type, "application/samlmetadata+xml");

    let body = response.text().await?;
    assert!(
        body.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#),
        "unexpected prologue: {body}"
    );

    // The extracted document parses on its own, with the namespaces it
    // inherited from the aggregate root.
    let doc = roxmltree::Document::parse(&body)?;
    let root = doc.root_element();
    assert_eq!(root.tag_name().namespace(), Some(MD_NS));
    assert_eq!(root.tag_name().name(), "EntityDescriptor");
    assert_eq!(root.attribute("entityID"), Some(ENTITY_IDS[0]));
    assert!(doc
        .descendants()
        .any(|n| n.tag_name().name() == "DisplayName"
            && n.tag_name().namespace() == Some("urn:oasis:names:tc:SAML:metadata:ui")));

    assert!(!body.contains(ENTITY_IDS[1]));
    assert!(!body.contains("Signature"));
    Ok(())
}

/// Tests that repeated requests are served from the cache.
#[tokio::test]
async fn test_repeated_requests_fetch_once() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let first = env.get_entity("fed", Some(ENTITY_IDS[0])).await?.text().await?;
    let second = env.get_entity("FED", Some(ENTITY_IDS[0])).await?.text().await?;
    let other = env.get_entity("fed", Some(ENTITY_IDS[1])).await?;
    assert_eq!(first, second);
    assert_eq!(other.status(), StatusCode::OK);
    assert_eq!(env.upstream.hits(), 1);

    // `alias` shares the source URI and therefore the cache entry.
    let aliased = env.get_entity("alias", Some(ENTITY_IDS[0])).await?.text().await?;
    assert_eq!(aliased, first);
    assert_eq!(env.upstream.hits(), 1);
    Ok(())
}

/// Tests the entity ID rules at the HTTP boundary.
#[tokio::test]
async fn test_entity_id_validation() -> anyhow::Result<()> {
    let longest = format!("urn:{}", "a".repeat(1020));
    assert_eq!(longest.len(), 1024);
    let too_long = format!("{longest}a");

    let signer = TestSigner::generate();
    let aggregate = signed_aggregate(
        &signer,
        Utc::now() + TimeDelta::hours(1),
        &[ENTITY_IDS[0], longest.as_str()],
    );
    let env = TestEnv::with_aggregate(signer, aggregate).await?;

    let response = env.get_entity("fed", None).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(env.upstream.hits(), 0);

    for bad in ["", "urn:del\u{7f}", "urn:tab\there", "urn:caf\u{e9}", too_long.as_str()] {
        let response = env.get_entity("fed", Some(bad)).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{bad:?}");
        let body = response.text().await?;
        assert!(body.starts_with("invalid entity ID"), "{body}");
    }
    assert_eq!(env.upstream.hits(), 0);

    let response = env.get_entity("fed", Some(longest.as_str())).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

/// Tests the not-found responses.
#[tokio::test]
async fn test_not_found() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let response = env.get_entity("nosuchfederation", Some(ENTITY_IDS[0])).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.text().await?, "unknown federation: nosuchfederation");
    assert_eq!(env.upstream.hits(), 0);

    let response = env.get_entity("fed", Some("https://absent.example.test")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.text().await?,
        "entity not found: https://absent.example.test"
    );
    Ok(())
}

/// Tests that duplicated entity descriptors are refused.
#[tokio::test]
async fn test_ambiguous_entity() -> anyhow::Result<()> {
    let signer = TestSigner::generate();
    let aggregate = signed_aggregate(
        &signer,
        Utc::now() + TimeDelta::hours(1),
        &["urn:dup", "urn:dup", "urn:single"],
    );
    let env = TestEnv::with_aggregate(signer, aggregate).await?;

    let response = env.get_entity("fed", Some("urn:dup")).await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let response = env.get_entity("fed", Some("urn:single")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

/// Tests that upstream failures surface as bad gateway.
#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.upstream.fail_with(StatusCode::SERVICE_UNAVAILABLE);

    let response = env.get_entity("fed", Some(ENTITY_IDS[0])).await?;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = response.text().await?;
    assert!(body.starts_with("metadata fetch failed"), "{body}");
    assert!(body.contains("503"), "{body}");

    // Nothing was cached; the next request fetches again.
    let aggregate = signed_aggregate(
        &env.signer,
        Utc::now() + TimeDelta::hours(1),
        &ENTITY_IDS,
    );
    env.upstream.publish(aggregate);
    let response = env.get_entity("fed", Some(ENTITY_IDS[0])).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(env.upstream.hits(), 2);
    Ok(())
}

/// Tests the health endpoints.
#[tokio::test]
async fn test_health_endpoints() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    for path in ["/health", "/health/live", "/health/ready"] {
        let response = env.client.get(format!("{}{path}", env.base_url)).send().await?;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }
    assert_eq!(env.upstream.hits(), 0);
    Ok(())
}
