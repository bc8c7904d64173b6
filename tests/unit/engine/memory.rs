use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn store_requires_load_and_load_is_idempotent() {
    let mut engine = InMemoryEngine::new();
    assert!(engine.write_file("input.mp4", b"v").is_err());
    engine.load().unwrap();
    engine.load().unwrap();
    assert_eq!(engine.load_count(), 1);
    engine.write_file("input.mp4", b"v").unwrap();
    assert_eq!(engine.list_files().unwrap(), vec!["input.mp4"]);
}

#[test]
fn load_failure_is_reported_until_cleared() {
    let mut engine = InMemoryEngine::new().with_load_failure("wasm fetch failed");
    let err = engine.load().unwrap_err();
    assert!(err.to_string().contains("wasm fetch failed"));
    engine.clear_failures();
    engine.load().unwrap();
}

#[test]
fn stream_copy_reproduces_input() {
    let mut engine = InMemoryEngine::new();
    engine.load().unwrap();
    engine.write_file("input.mp4", b"video-bytes").unwrap();

    let mut events = Vec::new();
    engine
        .exec(
            &args(&["-i", "input.mp4", "-c", "copy", "output.mp4"]),
            &mut |e| events.push(e),
        )
        .unwrap();
    assert_eq!(engine.read_file("output.mp4").unwrap(), b"video-bytes");
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, EngineEvent::Progress(_)))
            .count(),
        3
    );
    assert_eq!(engine.commands().len(), 1);
}

#[test]
fn missing_input_fails_exec() {
    let mut engine = InMemoryEngine::new();
    engine.load().unwrap();
    let err = engine
        .exec(&args(&["-i", "input.mp4", "output.mp4"]), &mut |_| {})
        .unwrap_err();
    assert!(err.to_string().contains("input.mp4"));
    assert!(engine.list_files().unwrap().is_empty());
}

#[test]
fn scripted_exec_failure_leaves_no_output() {
    let mut engine = InMemoryEngine::new().with_exec_failure("Invalid data found");
    engine.load().unwrap();
    engine.write_file("input.mp4", b"v").unwrap();
    assert!(
        engine
            .exec(&args(&["-i", "input.mp4", "output.mp4"]), &mut |_| {})
            .is_err()
    );
    assert_eq!(engine.list_files().unwrap(), vec!["input.mp4"]);
}

#[test]
fn delete_of_missing_file_is_an_error() {
    let mut engine = InMemoryEngine::new();
    engine.load().unwrap();
    assert!(engine.delete_file("nope").is_err());
}

#[test]
fn listing_fails_once_budget_is_spent() {
    let mut engine = InMemoryEngine::new().with_list_failure_after(1);
    engine.load().unwrap();
    assert!(engine.list_files().unwrap().is_empty());
    assert!(engine.list_files().is_err());

    engine.clear_failures();
    assert!(engine.list_files().is_ok());
}
