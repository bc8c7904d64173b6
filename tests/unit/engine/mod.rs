use super::*;

#[test]
fn flat_names_only() {
    assert!(check_file_name("input.mp4").is_ok());
    assert!(check_file_name("overlay_0.png").is_ok());
    for bad in ["", ".", "..", "a/b", "..\\x", "nul\0"] {
        assert!(check_file_name(bad).is_err(), "{bad:?}");
    }
}

#[test]
fn shared_engine_is_a_singleton() {
    let a = shared_engine();
    let b = shared_engine();
    assert!(Arc::ptr_eq(&a, &b));
}
