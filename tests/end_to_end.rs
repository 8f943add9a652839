//! End-to-end scenarios through the router with the shipped page template.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use decoy_board::core::{Batch, Record, SnapshotStore, BATCH_SIZE};
use decoy_board::generator::{Generator, RealEntryCooldown};
use decoy_board::infrastructure::config::GeneratorConfig;
use decoy_board::infrastructure::{router, AppState, BoardMetrics};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tower::ServiceExt;

const SEED: u64 = 0xDEADBEEF;
const REAL_NAME: &str = "@the.real.one";

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn state(store: Arc<SnapshotStore>, root: PathBuf) -> AppState {
    AppState {
        store,
        metrics: Arc::new(BoardMetrics::new()),
        template_root: Arc::new(root),
    }
}

/// Fixed seed, one forced cycle with the real entry injected
fn seeded_store() -> (Arc<SnapshotStore>, usize) {
    let store = Arc::new(SnapshotStore::new());
    let config = GeneratorConfig {
        seed: Some(SEED),
        ..GeneratorConfig::default()
    };
    let now = OffsetDateTime::now_utc();
    let three_days_ago = now - Duration::from_secs(3 * 24 * 60 * 60);
    let overdue = RealEntryCooldown::new(config.base_window(), config.jitter(), three_days_ago);

    let metrics = Arc::new(BoardMetrics::new());
    let mut generator = Generator::starting_at(&config, REAL_NAME, store.clone(), metrics, now)
        .with_cooldown(overdue);
    let report = generator.run_cycle(now);

    (store, report.real_index.expect("cooldown was overdue"))
}

async fn get(app: axum::Router, path: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_page_lists_full_batch() {
    let (store, _) = seeded_store();
    let app = router(state(store, repo_root()), true);

    let (status, html) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(html.matches("<tr class=\"row\">").count(), BATCH_SIZE);
    assert_eq!(html.matches(REAL_NAME).count(), 1);
}

#[tokio::test]
async fn test_csv_export_reversed() {
    let (store, real_index) = seeded_store();
    let generated: Vec<Record> = store.read(|batch| batch.records().to_vec());
    let app = router(state(store, repo_root()), true);

    let (status, body) = get(app, "/products-csv").await;
    assert_eq!(status, StatusCode::OK);

    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let header = reader.headers().unwrap().clone();
    assert_eq!(header.iter().collect::<Vec<_>>(), ["ID", "Telegram Username", "Product"]);

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), BATCH_SIZE);
    assert_eq!(body.lines().count(), BATCH_SIZE + 1);

    for (row, record) in rows.iter().zip(generated.iter().rev()) {
        assert!(row[1].starts_with('@'));
        assert_eq!(&row[1], record.name);
        assert_eq!(row[2].parse::<u32>().unwrap(), record.product);
    }

    // Real row sits at the mirrored position with a blank id
    let real_row = &rows[BATCH_SIZE - 1 - real_index];
    assert_eq!(&real_row[0], "");
    assert_eq!(&real_row[1], REAL_NAME);

    // Every synthetic row carries a UUID
    let with_id = rows.iter().filter(|r| !r[0].is_empty()).count();
    assert_eq!(with_id, BATCH_SIZE - 1);
}

#[tokio::test]
async fn test_page_before_first_generation() {
    let store = Arc::new(SnapshotStore::new());
    let app = router(state(store, repo_root()), true);

    let (status, html) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(html.matches("<tr class=\"row\">").count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_pages_never_torn() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("templates")).unwrap();
    std::fs::write(
        dir.path().join("templates/index.html"),
        "{% for r in records %}{{ r.name }}\n{% endfor %}",
    )
    .unwrap();

    fn uniform_batch(tag: u32) -> Batch {
        let records = (0..BATCH_SIZE)
            .map(|_| Record {
                id: None,
                name: format!("@tag{tag}"),
                factor_one: 1,
                factor_two: 1,
                product: 4,
            })
            .collect();
        Batch::from_records(records, OffsetDateTime::now_utc())
    }

    let store = Arc::new(SnapshotStore::new());
    store.publish(uniform_batch(0));
    let app = router(state(store.clone(), dir.path().to_path_buf()), false);

    let publisher = {
        let store = store.clone();
        tokio::task::spawn_blocking(move || {
            for tag in 1..20 {
                store.publish(uniform_batch(tag));
            }
        })
    };

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                for _ in 0..5 {
                    let (status, body) = get(app.clone(), "/").await;
                    assert_eq!(status, StatusCode::OK);

                    let names: Vec<&str> = body.lines().collect();
                    assert_eq!(names.len(), BATCH_SIZE);
                    assert!(names.iter().all(|n| *n == names[0]), "torn batch");
                }
            })
        })
        .collect();

    publisher.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
}
