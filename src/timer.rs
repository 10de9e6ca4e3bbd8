use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// How a countdown run finished. Only start and stop are ever persisted;
/// per-tick progress lives and dies with the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    /// The planned duration elapsed.
    Finished { elapsed_secs: u64 },
    /// The caller stopped the countdown early.
    Stopped { elapsed_secs: u64 },
}

impl TimerOutcome {
    pub fn elapsed_secs(&self) -> u64 {
        match *self {
            TimerOutcome::Finished { elapsed_secs } | TimerOutcome::Stopped { elapsed_secs } => {
                elapsed_secs
            }
        }
    }
}

/// Cooperative wall-clock countdown driven by a one second tick. Runs on the
/// current task; the suspension point is the tick wait and the cancellation
/// point is a message on `stop`. `on_tick` receives the remaining seconds.
pub async fn run_countdown(
    planned_secs: u64,
    mut stop: mpsc::Receiver<()>,
    mut on_tick: impl FnMut(u64),
) -> TimerOutcome {
    if planned_secs == 0 {
        return TimerOutcome::Finished { elapsed_secs: 0 };
    }

    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick resolves immediately; consume it so ticks mark whole
    // elapsed seconds.
    ticker.tick().await;

    let mut elapsed_secs = 0u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                elapsed_secs += 1;
                on_tick(planned_secs.saturating_sub(elapsed_secs));
                if elapsed_secs >= planned_secs {
                    return TimerOutcome::Finished { elapsed_secs };
                }
            }
            _ = stop.recv() => {
                return TimerOutcome::Stopped { elapsed_secs };
            }
        }
    }
}

pub fn format_clock(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn countdown_runs_to_completion() {
        let (_tx, rx) = mpsc::channel(1);
        let mut seen = Vec::new();
        let outcome = run_countdown(3, rx, |remaining| seen.push(remaining)).await;
        assert_eq!(outcome, TimerOutcome::Finished { elapsed_secs: 3 });
        assert_eq!(seen, vec![2, 1, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_the_countdown() {
        let (tx, rx) = mpsc::channel(1);
        tx.send(()).await.unwrap();
        let outcome = run_countdown(600, rx, |_| {}).await;
        assert!(matches!(outcome, TimerOutcome::Stopped { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_finishes_immediately() {
        let (_tx, rx) = mpsc::channel(1);
        let outcome = run_countdown(0, rx, |_| {}).await;
        assert_eq!(outcome, TimerOutcome::Finished { elapsed_secs: 0 });
    }

    #[test]
    fn clock_format_is_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(125), "02:05");
        assert_eq!(format_clock(3600), "60:00");
    }
}
