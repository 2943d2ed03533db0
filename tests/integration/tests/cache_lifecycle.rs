//! Cache expiry against a live upstream.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{SubsecRound, TimeDelta, Utc};
use smp_cache::{CacheError, Clock, HttpMetadataFetcher, ManualClock, MetadataCache};
use smp_federation::FederationRegistry;
use smp_metadata::testing::{tamper_signature_value, TestSigner};
use smp_metadata::{extract_entity, MetadataError};
use tempfile::NamedTempFile;

use crate::common::{init_tracing, pinned_certificate, signed_aggregate, Upstream, ENTITY_IDS};

struct Harness {
    upstream: Upstream,
    signer: TestSigner,
    clock: Arc<ManualClock>,
    cache: MetadataCache,
    _pinned: NamedTempFile,
}

async fn harness(skip_signature_validation: bool) -> anyhow::Result<Harness> {
    init_tracing();
    let signer = TestSigner::generate();
    let start = Utc::now().trunc_subsecs(0);
    let upstream =
        Upstream::start(signed_aggregate(&signer, start + TimeDelta::hours(1), &ENTITY_IDS))
            .await?;
    let pinned = pinned_certificate(&signer)?;

    let mut builder = FederationRegistry::builder();
    builder.register("fed", upstream.url.clone(), pinned.path(), skip_signature_validation)?;

    let clock = Arc::new(ManualClock::new(start));
    let fetcher = Arc::new(HttpMetadataFetcher::new()?);
    let cache = MetadataCache::new(Arc::new(builder.build()), fetcher).with_clock(clock.clone());

    Ok(Harness {
        upstream,
        signer,
        clock,
        cache,
        _pinned: pinned,
    })
}

/// Tests that an expired entry triggers exactly one refetch.
#[tokio::test]
async fn test_refetch_after_valid_until() -> anyhow::Result<()> {
    let h = harness(false).await?;

    let first = h.cache.get_metadata("fed").await?;
    let first_expiry = first.valid_until();
    assert_eq!(h.cache.expires_at("fed")?, Some(first_expiry));

    let again = h.cache.get_metadata("fed").await?;
    assert_eq!(first.xml(), again.xml());
    assert_eq!(h.upstream.hits(), 1);

    let next_expiry = first_expiry + TimeDelta::hours(12);
    h.upstream.publish(signed_aggregate(&h.signer, next_expiry, &ENTITY_IDS[..1]));
    h.clock.set(first_expiry);

    let refreshed = h.cache.get_metadata("fed").await?;
    assert_eq!(h.upstream.hits(), 2);
    assert_eq!(refreshed.valid_until(), next_expiry);
    assert_eq!(h.cache.expires_at("fed")?, Some(next_expiry));
    assert_eq!(refreshed.entity_count(), 1);

    h.cache.get_metadata("fed").await?;
    assert_eq!(h.upstream.hits(), 2);
    Ok(())
}

/// Tests that a failed refresh of an expired entry is an error.
#[tokio::test]
async fn test_failed_refresh_does_not_serve_stale_metadata() -> anyhow::Result<()> {
    let h = harness(false).await?;
    let first = h.cache.get_metadata("fed").await?;

    h.upstream.fail_with(StatusCode::INTERNAL_SERVER_ERROR);
    h.clock.set(first.valid_until() + TimeDelta::seconds(1));

    let err = h.cache.get_metadata("fed").await.unwrap_err();
    assert!(
        matches!(err, CacheError::Metadata(MetadataError::Fetch(_))),
        "{err:?}"
    );
    Ok(())
}

/// Tests that a skipped signature check still caches until `validUntil`.
#[tokio::test]
async fn test_skipped_signature_is_cached_with_declared_expiry() -> anyhow::Result<()> {
    let h = harness(true).await?;
    let valid_until = h.clock.now() + TimeDelta::hours(3);
    h.upstream.publish(tamper_signature_value(&signed_aggregate(
        &h.signer,
        valid_until,
        &ENTITY_IDS,
    )));

    let document = h.cache.get_metadata("fed").await?;
    assert_eq!(document.valid_until(), valid_until);
    assert_eq!(h.cache.expires_at("fed")?, Some(valid_until));

    // Extracted entities keep their entityID exactly.
    for entity_id in ENTITY_IDS {
        let entity = extract_entity(entity_id, &document)?;
        let parsed = roxmltree::Document::parse(entity.xml())?;
        assert_eq!(parsed.root_element().attribute("entityID"), Some(entity_id));
    }
    Ok(())
}
