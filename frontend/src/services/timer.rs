//! Browser timer backing banner expiry.

use gloo_timers::future::TimeoutFuture;

use crate::manager::Timer;

/// `setTimeout`-based [`Timer`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTimer;

impl Timer for BrowserTimer {
    async fn sleep_ms(&self, ms: u32) {
        TimeoutFuture::new(ms).await;
    }
}
