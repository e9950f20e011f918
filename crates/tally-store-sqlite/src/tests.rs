//! Integration tests for `SqliteStore` against an in-memory database,
//! including the registration and scan services running on top of it.

use tally_core::{
  digest::identity_token,
  record::{CycleStage, IdentityToken, PersonDetails},
  register::{Enrollment, RegisterError, register},
  scan::{ScanOutcome, process_scan},
  store::AttendanceStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn enrollment() -> Enrollment {
  Enrollment {
    given_name:  "Ana".into(),
    family_name: "Lopez".into(),
    document_id: "12345678".into(),
  }
}

fn unknown_token() -> IdentityToken {
  "d".repeat(64).parse().unwrap()
}

// ─── Upsert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_if_absent_creates_then_returns_existing() {
  let s = store().await;
  let token = identity_token("Ana", "Lopez", "12345678");

  let (rec, created) = s
    .create_if_absent(&token, PersonDetails::default())
    .await
    .unwrap();
  assert!(created);
  assert_eq!(rec.token, token);
  assert_eq!(rec.entry_time, 0);
  assert_eq!(rec.exit_time, 0);

  let (rec2, created2) = s
    .create_if_absent(&token, PersonDetails::default())
    .await
    .unwrap();
  assert!(!created2);
  assert_eq!(rec2, rec);
}

#[tokio::test]
async fn get_unknown_returns_none() {
  let s = store().await;
  assert!(s.get(&unknown_token()).await.unwrap().is_none());
}

// ─── Registration service ────────────────────────────────────────────────────

#[tokio::test]
async fn register_twice_is_idempotent() {
  let s = store().await;

  let first = register(&s, &enrollment()).await.unwrap();
  assert!(first.newly_created);

  let second = register(&s, &enrollment()).await.unwrap();
  assert!(!second.newly_created);
  assert_eq!(second.token, first.token);
  assert_eq!(second.record.entry_time, 0);
  assert_eq!(second.record.exit_time, 0);
}

#[tokio::test]
async fn register_rejects_empty_document_before_store() {
  let s = store().await;
  let bad = Enrollment {
    given_name:  "Ana".into(),
    family_name: "Lopez".into(),
    document_id: "   ".into(),
  };

  let err = register(&s, &bad).await.unwrap_err();
  assert!(matches!(
    err,
    RegisterError::Invalid(tally_core::Error::EmptyField("document_id"))
  ));

  // Nothing was written.
  let token = identity_token("Ana", "Lopez", "   ");
  assert!(s.get(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn register_rejects_overlong_document_before_store() {
  let s = store().await;
  let bad = Enrollment {
    given_name:  "Ana".into(),
    family_name: "Lopez".into(),
    document_id: "1".repeat(21),
  };

  let err = register(&s, &bad).await.unwrap_err();
  assert!(matches!(
    err,
    RegisterError::Invalid(tally_core::Error::FieldTooLong {
      field: "document_id",
      max:   20,
    })
  ));

  assert!(s.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn register_strips_padding_onto_the_same_identity() {
  let s = store().await;
  let first = register(&s, &enrollment()).await.unwrap();

  let padded = Enrollment {
    given_name:  " Ana ".into(),
    family_name: "Lopez ".into(),
    document_id: " 12345678".into(),
  };
  let second = register(&s, &padded).await.unwrap();

  assert!(!second.newly_created);
  assert_eq!(second.token, first.token);
  assert_eq!(second.record.given_name.as_deref(), Some("Ana"));
}

#[tokio::test]
async fn register_backfills_legacy_record_without_resetting_timestamps() {
  let s = store().await;
  let token = identity_token("Ana", "Lopez", "12345678");

  // A record created before descriptive fields existed, mid-cycle.
  s.create_if_absent(&token, PersonDetails::default())
    .await
    .unwrap();
  s.apply_transition(&token, |mut rec| {
    rec.entry_time = 1_000;
    ((), rec)
  })
  .await
  .unwrap();

  let reg = register(&s, &enrollment()).await.unwrap();
  assert!(!reg.newly_created);
  assert_eq!(reg.record.given_name.as_deref(), Some("Ana"));
  assert_eq!(reg.record.family_name.as_deref(), Some("Lopez"));
  assert_eq!(reg.record.document_id.as_deref(), Some("12345678"));
  assert_eq!(reg.record.entry_time, 1_000);
  assert_eq!(reg.record.exit_time, 0);
}

#[tokio::test]
async fn backfill_keeps_fields_already_present() {
  let s = store().await;
  let token = identity_token("Ana", "Lopez", "12345678");

  s.create_if_absent(
    &token,
    PersonDetails {
      given_name:  Some("Ana".into()),
      family_name: None,
      document_id: None,
    },
  )
  .await
  .unwrap();

  let rec = s
    .backfill_details(
      &token,
      PersonDetails {
        given_name:  Some("Overwritten".into()),
        family_name: Some("Lopez".into()),
        document_id: Some("12345678".into()),
      },
    )
    .await
    .unwrap()
    .unwrap();

  assert_eq!(rec.given_name.as_deref(), Some("Ana"));
  assert_eq!(rec.family_name.as_deref(), Some("Lopez"));
}

#[tokio::test]
async fn backfill_unknown_token_returns_none() {
  let s = store().await;
  let result = s
    .backfill_details(&unknown_token(), PersonDetails::default())
    .await
    .unwrap();
  assert!(result.is_none());
}

// ─── Scan processing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn full_cycle_entry_exit_completed() {
  let s = store().await;
  let reg = register(&s, &enrollment()).await.unwrap();

  let first = process_scan(&s, &reg.token, 1_000).await.unwrap();
  assert_eq!(first.outcome, ScanOutcome::Entry { recorded_at: 1_000 });

  let second = process_scan(&s, &reg.token, 1_060).await.unwrap();
  assert_eq!(second.outcome, ScanOutcome::Exit { recorded_at: 1_060 });

  let third = process_scan(&s, &reg.token, 2_000).await.unwrap();
  assert_eq!(
    third.outcome,
    ScanOutcome::AlreadyCompleted { entered_at: 1_000, exited_at: 1_060 }
  );

  // Terminal: timestamps unchanged in storage.
  let rec = s.get(&reg.token).await.unwrap().unwrap();
  assert_eq!(rec.entry_time, 1_000);
  assert_eq!(rec.exit_time, 1_060);
  assert_eq!(rec.stage(), CycleStage::Completed);
}

#[tokio::test]
async fn scan_unknown_token_mutates_nothing() {
  let s = store().await;
  register(&s, &enrollment()).await.unwrap();

  let report = process_scan(&s, &unknown_token(), 1_000).await.unwrap();
  assert_eq!(report.outcome, ScanOutcome::UnknownIdentity);
  assert!(report.record.is_none());

  let all = s.list().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].entry_time, 0);
}

#[tokio::test]
async fn scan_report_carries_descriptive_fields() {
  let s = store().await;
  let reg = register(&s, &enrollment()).await.unwrap();

  let report = process_scan(&s, &reg.token, 1_000).await.unwrap();
  let rec = report.record.unwrap();
  assert_eq!(rec.display_name(), "Ana Lopez");
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_scans_yield_exactly_one_entry() {
  let s = store().await;
  let reg = register(&s, &enrollment()).await.unwrap();

  let mut tasks = Vec::new();
  for i in 0..16 {
    let s = s.clone();
    let token = reg.token.clone();
    tasks.push(tokio::spawn(async move {
      process_scan(&s, &token, 1_000 + i).await.unwrap().outcome
    }));
  }

  let mut entries = 0;
  let mut exits = 0;
  let mut completed = 0;
  for task in tasks {
    match task.await.unwrap() {
      ScanOutcome::Entry { .. } => entries += 1,
      ScanOutcome::Exit { .. } => exits += 1,
      ScanOutcome::AlreadyCompleted { .. } => completed += 1,
      ScanOutcome::UnknownIdentity => panic!("registered token went missing"),
    }
  }

  assert_eq!(entries, 1, "exactly one scan may win the entry transition");
  assert_eq!(exits, 1);
  assert_eq!(completed, 14);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_registrations_create_once() {
  let s = store().await;

  let mut tasks = Vec::new();
  for _ in 0..8 {
    let s = s.clone();
    tasks.push(tokio::spawn(async move {
      register(&s, &enrollment()).await.unwrap().newly_created
    }));
  }

  let created: usize = {
    let mut n = 0;
    for task in tasks {
      if task.await.unwrap() {
        n += 1;
      }
    }
    n
  };
  assert_eq!(created, 1);
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_orders_by_family_name() {
  let s = store().await;
  for (given, family, doc) in
    [("Camila", "Zevallos", "1"), ("Jean", "Bernilla", "2"), ("Andre", "Rebaza", "3")]
  {
    let e = Enrollment {
      given_name:  given.into(),
      family_name: family.into(),
      document_id: doc.into(),
    };
    register(&s, &e).await.unwrap();
  }

  let all = s.list().await.unwrap();
  let families: Vec<_> =
    all.iter().map(|r| r.family_name.clone().unwrap()).collect();
  assert_eq!(families, ["Bernilla", "Rebaza", "Zevallos"]);
}
