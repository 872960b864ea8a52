use frago_runs::{ContextStore, RunError, RunStatus, RunStore};
use tempfile::tempdir;

#[test]
fn current_run_mutual_exclusion_across_create_archive_flow() {
    let projects = tempdir().unwrap();
    let home = tempdir().unwrap();
    let store = RunStore::new(projects.path());
    let context = ContextStore::new(home.path(), projects.path());

    let run = store.create_run("Upwork Python jobs search", None).unwrap();
    context.set_current_run(&run.run_id, &run.theme_description).unwrap();

    let second = store.create_run("A second unrelated task", None).unwrap();
    let blocked = context.set_current_run(&second.run_id, &second.theme_description);
    assert!(matches!(blocked, Err(RunError::ContextAlreadySet { existing }) if existing == run.run_id));

    context.release_context().unwrap();
    context.set_current_run(&second.run_id, &second.theme_description).unwrap();
    let active = context.get_current_run().unwrap();
    assert_eq!(active.run_id, second.run_id);

    store.archive_run(&run.run_id).unwrap();
    let runs = store.list_runs(Some(RunStatus::Active)).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].instance.run_id, second.run_id);
}

#[test]
fn listing_reflects_log_and_screenshot_counts() {
    let projects = tempdir().unwrap();
    let store = RunStore::new(projects.path());
    let run = store.create_run("desc", Some("20260730-demo")).unwrap();

    let logger = frago_runs::RunLogger::new(&store.run_dir(&run.run_id));
    for i in 0..3 {
        logger
            .write_log(
                &format!("step-{i}"),
                frago_runs::LogStatus::Success,
                frago_runs::ActionType::Other,
                frago_runs::ExecutionMethod::Manual,
                serde_json::json!({}),
                vec![],
            )
            .unwrap();
    }

    let stats = store.statistics(&run.run_id).unwrap();
    assert_eq!(stats.log_entries, 3);

    let summaries = store.list_runs(None).unwrap();
    assert_eq!(summaries[0].log_count, 3);
}
