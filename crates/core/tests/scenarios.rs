//! End-to-end scenarios exercising `PackfsEngine` against a real temp directory:
//! no mocked filesystem, no mocked index — the same code path the CLI uses.

use packfs_core::intent::{
    AccessPreferences, AccessPurpose, Criteria, DiscoverPurpose, FileAccessIntent, FileDiscoverIntent,
    FileOrganizeIntent, FileTarget, FileUpdateIntent, OperationOptions, OrganizePurpose, UpdatePurpose,
};
use packfs_core::workflow::Workflow;
use packfs_core::{Intent, PackfsEngine};
use tempfile::TempDir;

async fn harness(files: &[(&str, &str)]) -> (TempDir, PackfsEngine) {
    let dir = TempDir::new().expect("failed to create temp dir");
    for (path, content) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }
    let engine = PackfsEngine::start(dir.path()).await.expect("engine failed to start");
    (dir, engine)
}

#[tokio::test]
async fn create_then_read_round_trips_through_the_facade() {
    let (_dir, mut engine) = harness(&[]).await;
    engine.write_file("notes/todo.md", "buy milk\nbuy bread").await.unwrap();
    let content = engine.read_file("notes/todo.md").await.unwrap();
    assert_eq!(content, "buy milk\nbuy bread");
}

#[tokio::test]
async fn semantic_search_surfaces_readme_for_a_loose_query() {
    let (_dir, mut engine) = harness(&[
        ("README.md", "# Project Overview\nThis project documents the onboarding process for new contributors."),
        ("src/lib.rs", "pub fn add(a: i32, b: i32) -> i32 { a + b }"),
    ])
    .await;

    let intent = FileDiscoverIntent {
        purpose: DiscoverPurpose::SearchSemantic,
        target: FileTarget { semantic_query: Some("project documentation".to_string()), ..Default::default() },
        options: OperationOptions::default(),
    };
    let result = engine.discover_files(&intent).await.unwrap();
    assert!(result.success);
    assert_eq!(result.files.first().map(|f| f.path.as_str()), Some("README.md"));
}

#[tokio::test]
async fn excluded_directories_never_surface_in_discovery() {
    let (_dir, mut engine) = harness(&[
        ("node_modules/pkg/index.js", "module.exports = {}"),
        ("src/app.js", "console.log('running the application now')"),
    ])
    .await;

    let intent = FileDiscoverIntent {
        purpose: DiscoverPurpose::SearchContent,
        target: FileTarget { semantic_query: Some("module".to_string()), ..Default::default() },
        options: OperationOptions::default(),
    };
    let result = engine.discover_files(&intent).await.unwrap();
    assert!(result.files.iter().all(|f| !f.path.contains("node_modules")));
}

#[tokio::test]
async fn list_shows_node_modules_but_hides_the_index_directory() {
    let (_dir, mut engine) = harness(&[
        ("node_modules/pkg/index.js", "module.exports = {}"),
        ("app.js", "console.log('running the application now')"),
    ])
    .await;

    let intent = FileDiscoverIntent {
        purpose: DiscoverPurpose::List,
        target: FileTarget::from_path(""),
        options: OperationOptions::default(),
    };
    let result = engine.discover_files(&intent).await.unwrap();
    assert!(result.success);
    // `list` is a single-level directory listing, not an indexing scan: only
    // the engine's own `.packfs` directory is hidden from it.
    assert!(result.files.iter().any(|f| f.path == "node_modules"));
    assert!(result.files.iter().any(|f| f.path == "app.js"));
    assert!(result.files.iter().all(|f| f.path != ".packfs"));
}

#[tokio::test]
async fn deeply_nested_file_beyond_max_depth_is_excluded_from_search() {
    let mut deep_path = String::new();
    for i in 0..15 {
        deep_path.push_str(&format!("level{i}/"));
    }
    deep_path.push_str("buried.txt");

    let (_dir, mut engine) = harness(&[(&deep_path, "buried content here, quite deep indeed")]).await;
    let intent = FileAccessIntent {
        purpose: AccessPurpose::VerifyExists,
        target: FileTarget::from_path(deep_path),
        preferences: AccessPreferences::default(),
        options: OperationOptions::default(),
    };
    // The file is on disk (verify_exists checks disk directly, not the index),
    // but it must never appear when discovered through search.
    let result = engine.access_file(&intent).await.unwrap();
    assert!(result.exists);

    let search = FileDiscoverIntent {
        purpose: DiscoverPurpose::SearchContent,
        target: FileTarget { semantic_query: Some("buried".to_string()), ..Default::default() },
        options: OperationOptions::default(),
    };
    let discovered = engine.discover_files(&search).await.unwrap();
    assert!(discovered.files.is_empty());
}

#[tokio::test]
async fn organize_move_refuses_multi_source_onto_single_file_destination() {
    let (_dir, mut engine) =
        harness(&[("a.txt", "alpha content line one"), ("b.txt", "beta content line two")]).await;

    let intent = FileOrganizeIntent {
        purpose: OrganizePurpose::Move,
        source: Some(FileTarget {
            criteria: Some(Criteria { name: Some("".to_string()), ..Default::default() }),
            ..Default::default()
        }),
        destination: Some(FileTarget::from_path("merged.txt")),
        options: OperationOptions::default(),
    };
    let result = engine.organize_files(&intent).await;
    assert!(result.is_err(), "expected a rejection when fanning multiple sources into one file destination");
}

#[tokio::test]
async fn find_distinguishes_zero_matches_from_missing_named_target() {
    let (_dir, mut engine) = harness(&[("present.md", "some reasonably long content here")]).await;

    let named_missing = FileDiscoverIntent {
        purpose: DiscoverPurpose::Find,
        target: FileTarget::from_path("absent.md"),
        options: OperationOptions::default(),
    };
    let result = engine.discover_files(&named_missing).await.unwrap();
    assert!(!result.success);
    assert!(!result.suggestions.is_empty());

    let criteria_zero_hits = FileDiscoverIntent {
        purpose: DiscoverPurpose::Find,
        target: FileTarget {
            criteria: Some(Criteria { file_type: Some(vec!["nonexistent".to_string()]), ..Default::default() }),
            ..Default::default()
        },
        options: OperationOptions::default(),
    };
    let result = engine.discover_files(&criteria_zero_hits).await.unwrap();
    assert!(result.success);
    assert_eq!(result.total_found, 0);
}

#[tokio::test]
async fn remove_reconciles_deletions_on_next_start() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.md"), "some reasonably long content here").unwrap();
    let mut engine = PackfsEngine::start(dir.path()).await.unwrap();
    assert!(engine.exists("a.md").await.unwrap());
    engine.remove("a.md").await.unwrap();
    engine.stop().await.unwrap();

    // Simulate removing the file through some other process entirely, then
    // restarting: the reconciliation pass on start must drop the stale entry.
    std::fs::write(dir.path().join("b.md"), "more content that stays around").unwrap();
    let reopened = PackfsEngine::start(dir.path()).await.unwrap();
    assert!(!reopened.base_dir().join("a.md").exists());
}

#[tokio::test]
async fn atomic_workflow_reports_failure_without_raising_an_error() {
    let (_dir, mut engine) = harness(&[]).await;
    let steps = vec![
        Intent::Update(FileUpdateIntent {
            purpose: UpdatePurpose::Create,
            target: FileTarget::from_path("one.txt"),
            content: Some("first".to_string()),
            options: OperationOptions::default(),
        }),
        Intent::Update(FileUpdateIntent {
            purpose: UpdatePurpose::Create,
            target: FileTarget::from_path("one.txt"),
            content: Some("second".to_string()),
            options: OperationOptions::default(),
        }),
    ];
    let workflow = Workflow::new(steps).atomic();
    let result = engine.run_workflow(&workflow).await;
    assert!(!result.success);
    assert!(result.rollback_required);
    assert_eq!(engine.read_file("one.txt").await.unwrap(), "first");
}
