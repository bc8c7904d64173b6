use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ReelError::font("x").to_string().contains("font error:"));
    assert!(ReelError::raster("x").to_string().contains("raster error:"));
    assert!(ReelError::engine("x").to_string().contains("engine error:"));
    assert!(ReelError::fetch("x").to_string().contains("fetch error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn stage_annotation_names_the_stage_and_keeps_innermost() {
    let err = ReelError::fetch("404").at_stage(ExportStage::Fetch);
    assert_eq!(err.stage(), Some(ExportStage::Fetch));
    let msg = err.to_string();
    assert!(msg.contains("video fetch"));
    assert!(msg.contains("404"));

    let rewrapped = err.at_stage(ExportStage::Execute);
    assert_eq!(rewrapped.stage(), Some(ExportStage::Fetch));
}

#[test]
fn unstaged_errors_report_no_stage() {
    assert_eq!(ReelError::engine("x").stage(), None);
}
