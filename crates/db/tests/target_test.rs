//! Integration tests for targets and their revisions.

mod common;

use common::{Fixture, day};
use esg_core::DomainError;
use esg_core::target::{NewTargetRevision, Target};
use esg_core::vocab::{TargetScope, TargetStatus};
use esg_db::{RepositoryError, TargetRepository};
use esg_shared::types::{FirmId, TargetId};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_reference_number_is_unique_per_firm() {
    let fx = Fixture::new().await;
    let repo = TargetRepository::new(fx.db.clone());

    repo.create(Target::new(fx.firm, day(2020, 1, 1)).numbered(1))
        .await
        .unwrap();
    repo.create(Target::new(fx.firm, day(2021, 1, 1)).numbered(2))
        .await
        .unwrap();
    // Same number, other firm.
    repo.create(Target::new(fx.other_firm, day(2021, 1, 1)).numbered(1))
        .await
        .unwrap();

    let taken = repo
        .create(Target::new(fx.firm, day(2022, 1, 1)).numbered(2))
        .await;
    match taken {
        Err(RepositoryError::Domain(DomainError::ConstraintViolation { entity, .. })) => {
            assert_eq!(entity, "target");
        }
        other => panic!("expected ConstraintViolation, got {other:?}"),
    }

    let numbers: Vec<_> = repo
        .for_firm(fx.firm)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.reference_number)
        .collect();
    assert_eq!(numbers, vec![1, 2]);
}

#[tokio::test]
async fn test_target_round_trip() {
    let fx = Fixture::new().await;
    let repo = TargetRepository::new(fx.db.clone());
    let target = repo
        .create(Target::new(fx.firm, day(2020, 6, 1)).covering(TargetScope::Scope12))
        .await
        .unwrap();

    let loaded = repo.get(target.id).await.unwrap();
    assert_eq!(loaded, target);
    assert_eq!(loaded.scope.scopes(), &[1, 2]);
    assert_eq!(loaded.status, TargetStatus::Unspecified);
}

#[tokio::test]
async fn test_target_requires_firm() {
    let fx = Fixture::new().await;
    let repo = TargetRepository::new(fx.db.clone());
    let orphan = repo.create(Target::new(FirmId::new(), day(2020, 1, 1))).await;
    assert!(matches!(
        orphan,
        Err(RepositoryError::Domain(DomainError::MissingRequiredReference { entity: "firm", .. }))
    ));

    let revision = repo
        .add_revision(TargetId::new(), NewTargetRevision::new(day(2021, 4, 1), 2019, 2030, dec!(50)))
        .await;
    assert!(matches!(
        revision,
        Err(RepositoryError::Domain(DomainError::MissingRequiredReference { entity: "target", .. }))
    ));
}

#[tokio::test]
async fn test_revisions_are_append_only() {
    let fx = Fixture::new().await;
    let repo = TargetRepository::new(fx.db.clone());
    let target = repo.create(Target::new(fx.firm, day(2020, 1, 1))).await.unwrap();

    assert!(repo.latest_revision(target.id).await.unwrap().is_none());

    let first = repo
        .add_revision(target.id, NewTargetRevision::new(day(2021, 4, 1), 2019, 2030, dec!(50)))
        .await
        .unwrap();
    // Identical snapshots are both kept.
    let repeat = repo
        .add_revision(target.id, NewTargetRevision::new(day(2021, 4, 1), 2019, 2030, dec!(50)))
        .await
        .unwrap();
    let latest = repo
        .add_revision(
            target.id,
            NewTargetRevision {
                status: TargetStatus::Underway,
                percent_of_total: dec!(42.125),
                ..NewTargetRevision::new(day(2023, 4, 1), 2019, 2030, dec!(55))
            },
        )
        .await
        .unwrap();
    assert_eq!(latest.percent_of_total, dec!(42.13));

    let revisions = repo.revisions(target.id).await.unwrap();
    assert_eq!(revisions.len(), 3);
    assert_eq!(revisions[0].id, latest.id);
    assert!(revisions[1..].iter().all(|r| r.id == first.id || r.id == repeat.id));

    let newest = repo.latest_revision(target.id).await.unwrap().unwrap();
    assert_eq!(newest.id, latest.id);
    assert_eq!(newest.status, TargetStatus::Underway);
    assert_eq!(newest.targeted_reduction, dec!(55));
}

#[tokio::test]
async fn test_deleting_a_target_drops_revisions() {
    let fx = Fixture::new().await;
    let repo = TargetRepository::new(fx.db.clone());
    let target = repo.create(Target::new(fx.firm, day(2020, 1, 1))).await.unwrap();
    repo.add_revision(target.id, NewTargetRevision::new(day(2021, 4, 1), 2019, 2030, dec!(50)))
        .await
        .unwrap();

    assert!(repo.delete(target.id).await.unwrap());
    assert!(repo.revisions(target.id).await.unwrap().is_empty());
    assert!(matches!(
        repo.get(target.id).await,
        Err(RepositoryError::NotFound { entity: "target", .. })
    ));
}
