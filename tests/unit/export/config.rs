use std::collections::HashMap;

use super::*;

fn info(width: u32, height: u32) -> MediaInfo {
    MediaInfo {
        width,
        height,
        duration_sec: Some(3.0),
        has_audio: true,
    }
}

#[test]
fn defaults_target_portrait_1080() {
    let opts = ExportOpts::default();
    assert_eq!(opts.frame, FrameSize::new(1080, 1920).unwrap());
    assert_eq!(opts.frame_policy, FramePolicy::Fixed);
    assert_eq!(opts.fetch_timeout_secs, 120);
    opts.validate().unwrap();
}

#[test]
fn env_overlay_parses_every_key() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("REELTEXT_FFMPEG", "/opt/ffmpeg/bin/ffmpeg"),
        ("REELTEXT_THREADS", "3"),
        ("REELTEXT_FRAME", "720x1280"),
        ("REELTEXT_FONT_DIRS", "/a/fonts"),
    ]);
    let mut opts = ExportOpts::default();
    opts.apply_env(|k| vars.get(k).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(opts.ffmpeg, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
    assert_eq!(opts.ffprobe, PathBuf::from("ffprobe"));
    assert_eq!(opts.threads, Some(3));
    assert_eq!(opts.frame, FrameSize::new(720, 1280).unwrap());
    assert_eq!(opts.font_dirs, vec![PathBuf::from("/a/fonts")]);
}

#[test]
fn env_overlay_rejects_garbage() {
    let mut opts = ExportOpts::default();
    assert!(
        opts.apply_env(|k| (k == "REELTEXT_THREADS").then(|| "many".to_string()))
            .is_err()
    );
    let mut opts = ExportOpts::default();
    assert!(
        opts.apply_env(|k| (k == "REELTEXT_FRAME").then(|| "1080".to_string()))
            .is_err()
    );
}

#[test]
fn opts_deserialize_partially() {
    let opts: ExportOpts =
        serde_json::from_str(r#"{"frame_policy":"match-source","threads":2}"#).unwrap();
    assert_eq!(opts.frame_policy, FramePolicy::MatchSource);
    assert_eq!(opts.threads, Some(2));
    assert_eq!(opts.frame, FrameSize::PORTRAIT_1080);
}

#[test]
fn frame_policy_resolution() {
    let mut opts = ExportOpts::default();
    let other = info(720, 1280);

    assert_eq!(opts.resolve_frame(None).unwrap(), opts.frame);
    assert_eq!(opts.resolve_frame(Some(&other)).unwrap(), opts.frame);

    opts.frame_policy = FramePolicy::Strict;
    let err = opts.resolve_frame(Some(&other)).unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
    assert_eq!(
        opts.resolve_frame(Some(&info(1080, 1920))).unwrap(),
        opts.frame
    );

    opts.frame_policy = FramePolicy::MatchSource;
    assert_eq!(
        opts.resolve_frame(Some(&other)).unwrap(),
        FrameSize::new(720, 1280).unwrap()
    );
}

#[test]
fn frame_policy_from_str() {
    assert_eq!("strict".parse::<FramePolicy>().unwrap(), FramePolicy::Strict);
    assert_eq!(
        "match-source".parse::<FramePolicy>().unwrap(),
        FramePolicy::MatchSource
    );
    assert!("stretch".parse::<FramePolicy>().is_err());
}
