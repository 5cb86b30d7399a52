//! Request quota accounting.
//!
//! Tracks a process-lifetime counter against a fixed monthly quota. The
//! counter only increases; reset is an external concern (deployment restart
//! or reconfiguration).

use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use tracing::warn;

use crate::error::ClientError;

const SOURCE: &str = "rate";

/// Share of the quota at which a warning is emitted.
const WARN_NUMERATOR: u64 = 4;
const WARN_DENOMINATOR: u64 = 5;

#[derive(Debug)]
pub struct RateAccountant {
    monthly_limit: u64,
    used: AtomicU64,
}

impl RateAccountant {
    pub fn new(monthly_limit: u64) -> Self {
        Self {
            monthly_limit,
            used: AtomicU64::new(0),
        }
    }

    /// Account one request. Increments unconditionally, then fails with
    /// `QuotaExceeded` once the quota has already been consumed.
    pub fn record(&self) -> Result<(), ClientError> {
        let previous = self.used.fetch_add(1, Ordering::Relaxed);
        let used = previous + 1;

        // checked_mul: limits past u64::MAX / 4 would overflow the scaled form.
        let warn_at = self
            .monthly_limit
            .checked_mul(WARN_NUMERATOR)
            .map(|scaled| scaled / WARN_DENOMINATOR)
            .unwrap_or_else(|| self.monthly_limit / WARN_DENOMINATOR * WARN_NUMERATOR);
        if used == warn_at && used < self.monthly_limit {
            warn!(
                target_module = SOURCE,
                used,
                monthly_limit = self.monthly_limit,
                "request quota 80% consumed"
            );
        }

        if previous >= self.monthly_limit {
            counter!("foglio_quota_rejected_total").increment(1);
            return Err(ClientError::QuotaExceeded {
                limit: self.monthly_limit,
            });
        }

        Ok(())
    }

    /// Requests accounted so far, including rejected ones.
    pub fn used(&self) -> u64 {
        self.used.load(Ordering::Relaxed)
    }

    pub fn monthly_limit(&self) -> u64 {
        self.monthly_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_within_quota_succeed() {
        let rate = RateAccountant::new(5);
        for _ in 0..5 {
            rate.record().expect("within quota");
        }
        assert_eq!(rate.used(), 5);
    }

    #[test]
    fn call_past_quota_fails() {
        let rate = RateAccountant::new(3);
        for _ in 0..3 {
            rate.record().expect("within quota");
        }

        let err = rate.record().expect_err("past quota");
        assert!(matches!(err, ClientError::QuotaExceeded { limit: 3 }));
    }

    #[test]
    fn rejected_calls_still_count() {
        let rate = RateAccountant::new(2);
        let _ = rate.record();
        let _ = rate.record();
        let _ = rate.record();
        let _ = rate.record();
        assert_eq!(rate.used(), 4);
    }

    #[test]
    fn huge_quota_does_not_overflow_the_warn_threshold() {
        let rate = RateAccountant::new(u64::MAX);
        rate.record().expect("within quota");
        rate.record().expect("within quota");
    }

    #[test]
    fn warns_exactly_once_at_eighty_percent() {
        use std::io;
        use std::sync::{Arc, Mutex};

        use tracing_subscriber::fmt::MakeWriter;

        #[derive(Clone)]
        struct Capture(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Capture {
            fn write(&mut self, data: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(data);
                Ok(data.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        impl<'a> MakeWriter<'a> for Capture {
            type Writer = Capture;

            fn make_writer(&'a self) -> Self::Writer {
                self.clone()
            }
        }

        let capture = Capture(Arc::new(Mutex::new(Vec::new())));
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let rate = RateAccountant::new(10);
            for _ in 0..10 {
                rate.record().expect("within quota");
            }
            let _ = rate.record();
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("request quota 80% consumed").count(), 1);
    }
}
