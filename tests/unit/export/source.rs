use super::*;

#[test]
fn parse_distinguishes_urls_and_paths() {
    assert_eq!(
        VideoSource::parse("https://cdn.example.com/clip.mp4"),
        VideoSource::Url("https://cdn.example.com/clip.mp4".to_string())
    );
    assert_eq!(
        VideoSource::parse("HTTP://host/a.mp4"),
        VideoSource::Url("HTTP://host/a.mp4".to_string())
    );
    assert_eq!(
        VideoSource::parse("file:///tmp/a.mp4"),
        VideoSource::Path(PathBuf::from("/tmp/a.mp4"))
    );
    assert_eq!(
        VideoSource::parse("clips/a.mp4"),
        VideoSource::Path(PathBuf::from("clips/a.mp4"))
    );
}

#[test]
fn fetch_reads_local_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("in.mp4");
    std::fs::write(&path, b"not really a video").unwrap();
    let bytes = VideoSource::from(path.as_path())
        .fetch(Duration::from_secs(1))
        .unwrap();
    assert_eq!(bytes, b"not really a video");
}

#[test]
fn fetch_failures_are_fetch_errors() {
    let err = VideoSource::parse("/definitely/missing.mp4")
        .fetch(Duration::from_secs(1))
        .unwrap_err();
    assert!(matches!(err, ReelError::Fetch(_)));

    let err = VideoSource::Bytes(Vec::new())
        .fetch(Duration::from_secs(1))
        .unwrap_err();
    assert!(matches!(err, ReelError::Fetch(_)));
}
