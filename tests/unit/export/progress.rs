use std::sync::mpsc;
use std::time::{Duration, Instant};

use super::*;

#[test]
fn fraction_maps_to_whole_percent() {
    assert_eq!(to_percent(0.0), 0);
    assert_eq!(to_percent(0.254), 25);
    assert_eq!(to_percent(0.999), 100);
    assert_eq!(to_percent(7.0), 100);
    assert_eq!(to_percent(-1.0), 0);
    assert_eq!(to_percent(f64::NAN), 0);
}

fn collect(rx: &mpsc::Receiver<u8>, until: u8) -> Vec<u8> {
    let mut seen = Vec::new();
    while let Ok(p) = rx.recv_timeout(Duration::from_secs(5)) {
        seen.push(p);
        if p == until {
            break;
        }
    }
    seen
}

#[test]
fn reports_reach_callback_in_order_without_repeats() {
    let (tx, rx) = mpsc::channel();
    let mut reporter = ProgressReporter::new(Some(Box::new(move |p| {
        let _ = tx.send(p);
    })));
    for f in [0.1, 0.1, 0.5, 0.5, 1.0] {
        reporter.report(f);
    }
    reporter.finish();
    assert_eq!(collect(&rx, 100), vec![10, 50, 100]);
}

#[test]
fn slow_callback_does_not_block_reporting() {
    let mut reporter = ProgressReporter::new(Some(Box::new(|_| {
        std::thread::sleep(Duration::from_millis(50));
    })));
    let start = Instant::now();
    for i in 0..=20 {
        reporter.report(f64::from(i) / 20.0);
    }
    assert!(start.elapsed() < Duration::from_millis(50));
}

#[test]
fn finish_does_not_wait_for_queued_callbacks() {
    let (tx, rx) = mpsc::channel();
    let mut reporter = ProgressReporter::new(Some(Box::new(move |p| {
        std::thread::sleep(Duration::from_millis(200));
        let _ = tx.send(p);
    })));
    reporter.report(0.3);
    reporter.report(1.0);

    let start = Instant::now();
    reporter.finish();
    assert!(start.elapsed() < Duration::from_millis(200));
    assert_eq!(collect(&rx, 100), vec![30, 100]);
}

#[test]
fn no_callback_is_a_no_op() {
    let mut reporter = ProgressReporter::new(None);
    reporter.report(0.5);
    reporter.finish();
}
