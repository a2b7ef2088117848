// Drives a session through a full offline-then-online lifecycle using only the public API.

use std::sync::Arc;

use appliance_common::models::{ApplianceInput, Identity, WarrantyStatus};
use appliance_common::services::{Clock, IdentityProvider, LocalCache};
use appliance_common::FixedClock;
use appliance_core::status::sub_calendar_months;
use appliance_core::validation::validate_appliance;
use appliance_core::{ApplianceSession, DataSource, FileCache, MemoryStore, StaticIdentityProvider};
use chrono::{TimeZone, Utc};

#[tokio::test]
async fn test_offline_edits_stay_local_after_sign_in() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap(),
    ));
    let store = Arc::new(MemoryStore::new(clock.clone()));
    let cache = Arc::new(FileCache::new(dir.path().join("appliances.json")));
    let provider = StaticIdentityProvider::default();
    let mut events = provider.subscribe();

    let mut session = ApplianceSession::new(store.clone(), cache.clone(), clock.clone());
    session.initialize(&provider).await.unwrap();
    assert_eq!(session.source(), Some(DataSource::SampleData));

    let input = ApplianceInput {
        name: "Water Heater".into(),
        brand: "Rheem".into(),
        model: "XE50T10H45U0".into(),
        purchase_date: Some(sub_calendar_months(clock.now(), 11)),
        warranty_duration_months: 12,
        ..ApplianceInput::default()
    };
    let offline = session
        .add_appliance(validate_appliance(input, clock.now()).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cache.load_snapshot().unwrap().unwrap().len(), 23);

    let view = session
        .views()
        .into_iter()
        .find(|v| v.appliance.id == offline.id)
        .unwrap();
    assert_eq!(view.warranty_status, WarrantyStatus::ExpiringSoon);

    provider.sign_in(Identity::new("owner").with_access_token("token"));
    session.apply_pending_events(&mut events).await;

    // The remote collection is authoritative and starts out empty.
    assert_eq!(session.source(), Some(DataSource::Remote));
    assert!(session.appliances().is_empty());
    assert_eq!(cache.load_snapshot().unwrap().unwrap().len(), 23);

    provider.sign_out();
    session.apply_pending_events(&mut events).await;
    session.reload().await;
    assert_eq!(session.source(), Some(DataSource::LocalCache));
    assert!(session.appliances().iter().any(|a| a.id == offline.id));
}
