use std::sync::mpsc;

/// Export progress callback, called with whole percents `0..=100`.
pub type ProgressFn = Box<dyn FnMut(u8) + Send + 'static>;

/// Forwards engine progress to a caller callback on a dedicated thread.
///
/// Neither `report` nor `finish` waits on the callback: values go through an unbounded
/// channel and the dispatcher thread is detached, draining whatever is queued after the
/// reporter is gone. Repeated percents are dropped.
pub struct ProgressReporter {
    tx: Option<mpsc::Sender<u8>>,
    last: Option<u8>,
}

impl ProgressReporter {
    pub fn new(callback: Option<ProgressFn>) -> Self {
        let Some(mut callback) = callback else {
            return Self { tx: None, last: None };
        };

        let (tx, rx) = mpsc::channel::<u8>();
        let dispatcher = std::thread::Builder::new()
            .name("reeltext-progress".to_string())
            .spawn(move || {
                for percent in rx {
                    callback(percent);
                }
            });
        match dispatcher {
            Ok(_detached) => Self {
                tx: Some(tx),
                last: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "progress dispatcher unavailable; progress disabled");
                Self { tx: None, last: None }
            }
        }
    }

    /// Report an engine fraction in `0.0..=1.0`.
    pub fn report(&mut self, fraction: f64) {
        let Some(tx) = &self.tx else {
            return;
        };
        let percent = to_percent(fraction);
        if self.last == Some(percent) {
            return;
        }
        self.last = Some(percent);
        if tx.send(percent).is_err() {
            // The callback panicked; stop reporting.
            self.tx = None;
        }
    }

    /// Close the channel. Queued percents still reach the callback afterwards.
    pub fn finish(mut self) {
        self.tx = None;
    }
}

pub(crate) fn to_percent(fraction: f64) -> u8 {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/export/progress.rs"]
mod tests;
