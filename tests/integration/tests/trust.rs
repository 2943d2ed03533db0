//! Certificate pinning and signature integration tests.

use axum::http::StatusCode;
use chrono::{TimeDelta, Utc};
use smp_metadata::testing::{tamper_signature_value, TestSigner};

use crate::common::{signed_aggregate, TestEnv, ENTITY_IDS};

/// Tests that an aggregate signed by another key is refused.
#[tokio::test]
async fn test_untrusted_signer_is_refused() -> anyhow::Result<()> {
    let pinned = TestSigner::generate();
    let impostor = TestSigner::generate();
    let aggregate = signed_aggregate(&impostor, Utc::now() + TimeDelta::hours(1), &ENTITY_IDS);
    let env = TestEnv::with_aggregate(pinned, aggregate).await?;

    for federation in ["fed", "lenient"] {
        let response = env.get_entity(federation, Some(ENTITY_IDS[0])).await?;
        assert_eq!(
            response.status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "{federation}"
        );
        let body = response.text().await?;
        assert!(body.starts_with("untrusted signing certificate"), "{body}");
    }
    Ok(())
}

/// Tests that a corrupted signature is refused unless validation is skipped.
#[tokio::test]
async fn test_corrupted_signature() -> anyhow::Result<()> {
    let signer = TestSigner::generate();
    let valid_until = Utc::now() + TimeDelta::hours(1);
    let aggregate = tamper_signature_value(&signed_aggregate(&signer, valid_until, &ENTITY_IDS));
    let env = TestEnv::with_aggregate(signer, aggregate).await?;

    let response = env.get_entity("fed", Some(ENTITY_IDS[0])).await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.text().await?;
    assert!(body.starts_with("signature validation failed"), "{body}");

    let response = env.get_entity("lenient", Some(ENTITY_IDS[0])).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

/// Tests that an edited entity invalidates the signature.
#[tokio::test]
async fn test_modified_content_is_refused() -> anyhow::Result<()> {
    let signer = TestSigner::generate();
    let aggregate = signed_aggregate(&signer, Utc::now() + TimeDelta::hours(1), &ENTITY_IDS)
        .replace("/acs\"", "/evil-acs\"");
    let env = TestEnv::with_aggregate(signer, aggregate).await?;

    let response = env.get_entity("fed", Some(ENTITY_IDS[0])).await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

/// Tests that an aggregate that has already expired is refused.
#[tokio::test]
async fn test_expired_aggregate_is_refused() -> anyhow::Result<()> {
    let signer = TestSigner::generate();
    let aggregate = signed_aggregate(&signer, Utc::now() - TimeDelta::minutes(1), &ENTITY_IDS);
    let env = TestEnv::with_aggregate(signer, aggregate).await?;

    let response = env.get_entity("fed", Some(ENTITY_IDS[0])).await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.text().await?;
    assert!(body.starts_with("malformed metadata"), "{body}");
    Ok(())
}
