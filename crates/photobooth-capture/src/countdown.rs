//! Cooperative pre-capture countdown.

use std::time::Duration;

/// Interval between countdown ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Counts down from `seconds` to zero, suspending the caller between ticks.
///
/// `on_tick` receives `seconds, seconds - 1, ..., 1`, each followed by a
/// [`TICK_INTERVAL`] sleep, and finally `0` right before returning. The total
/// suspension is `seconds` intervals.
pub async fn run_countdown(seconds: u32, mut on_tick: impl FnMut(u32)) {
    for remaining in (1..=seconds).rev() {
        on_tick(remaining);
        tokio::time::sleep(TICK_INTERVAL).await;
    }
    on_tick(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_down_to_zero_over_configured_seconds() {
        let started = tokio::time::Instant::now();
        let mut ticks = Vec::new();

        run_countdown(3, |remaining| ticks.push(remaining)).await;

        assert_eq!(ticks, vec![3, 2, 1, 0]);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_countdown_proceeds_immediately() {
        let started = tokio::time::Instant::now();
        let mut ticks = Vec::new();

        run_countdown(0, |remaining| ticks.push(remaining)).await;

        assert_eq!(ticks, vec![0]);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
