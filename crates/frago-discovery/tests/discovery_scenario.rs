use frago_discovery::discover_similar_runs;
use frago_runs::RunStore;
use tempfile::tempdir;

#[test]
fn discovers_runs_ranked_by_similarity_and_recency() {
    let dir = tempdir().unwrap();
    let store = RunStore::new(dir.path());
    store.create_run("Upwork Python jobs search", Some("run-old")).unwrap();
    store.create_run("Upwork Python job listings", Some("run-new")).unwrap();
    store.create_run("Totally different gardening task", Some("run-unrelated")).unwrap();

    let matches = discover_similar_runs(&store, "upwork python jobs", None, None).unwrap();
    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|m| m.run_id != "run-unrelated"));
}
