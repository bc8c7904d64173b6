use super::*;

#[test]
fn radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6];
    let out = blur_plane(&src, 3, 2, 0, 1.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn radius_covers_three_sigma() {
    assert_eq!(radius_for_sigma(0.0), 0);
    assert_eq!(radius_for_sigma(-1.0), 0);
    assert_eq!(radius_for_sigma(2.0), 6);
    assert_eq!(radius_for_sigma(1.1), 4);
}

#[test]
fn spreads_energy_and_fades_at_borders() {
    let (w, h) = (9u32, 9u32);
    let mut src = vec![0u8; (w * h) as usize];
    src[(4 * w + 4) as usize] = 255;
    let out = blur_plane(&src, w, h, 3, 1.0).unwrap();
    assert!(out[(4 * w + 4) as usize] < 255);
    assert!(out[(4 * w + 5) as usize] > 0);
    assert_eq!(out[0], 0);

    // A constant plane darkens at the edge because outside samples are transparent.
    let flat = vec![200u8; (w * h) as usize];
    let out = blur_plane(&flat, w, h, 3, 2.0).unwrap();
    assert_eq!(out[(4 * w + 4) as usize], 200);
    assert!(out[0] < 200);
}

#[test]
fn rejects_mismatched_buffer() {
    assert!(blur_plane(&[0u8; 5], 2, 2, 1, 1.0).is_err());
    assert!(blur_plane(&[0u8; 4], 2, 2, 1, 0.0).is_err());
}
