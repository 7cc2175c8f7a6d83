//! Effect state machines
//!
//! Every effect owns its channels, tunables and runtime state. Effects never
//! hold on to the scheduler or the output stage; both are lent to them for
//! the duration of a call. Timer payloads are [`TimerTask`] values that the
//! engine dispatches back to the owning effect.

mod blink;
mod demo;
mod fire;
mod pulse;
mod status;

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

pub use blink::BlinkEffect;
pub use demo::DemoOrchestrator;
pub use fire::{DecayCurve, FireEffect, FireState};
pub use pulse::{Direction, PulseEffect};
pub use status::StatusIndicator;

use crate::scheduler::{ScheduleHandle, Scheduler};

const TIMER_NAME_BLINK: &str = "blink";
const TIMER_NAME_PULSE: &str = "pulse";
const TIMER_NAME_FIRE: &str = "fire";
const TIMER_NAME_DEMO: &str = "demo";
const TIMER_NAME_STATUS: &str = "status";

/// Timer slots used by the engine: one per task plus headroom
pub const MAX_TIMERS: usize = 8;

/// Scheduler type shared by all effects
pub type EffectScheduler = Scheduler<TimerTask, MAX_TIMERS>;

/// Timer payload naming the effect to tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    Blink,
    Pulse,
    Fire,
    Demo,
    Status,
}

impl TimerTask {
    /// Scheduler key of the task's timer
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blink => TIMER_NAME_BLINK,
            Self::Pulse => TIMER_NAME_PULSE,
            Self::Fire => TIMER_NAME_FIRE,
            Self::Demo => TIMER_NAME_DEMO,
            Self::Status => TIMER_NAME_STATUS,
        }
    }
}

/// Register the periodic timer of `task`, replacing its previous one
pub(crate) fn schedule_task(
    scheduler: &mut EffectScheduler,
    task: TimerTask,
    period: Duration,
    now: Instant,
) -> Option<ScheduleHandle> {
    let handle = scheduler.schedule_periodic(task.name(), period, now, task).ok();
    #[cfg(feature = "esp32-log")]
    if handle.is_none() {
        println!("[effect.schedule_task] no timer slot for '{}'", task.name());
    }
    handle
}

/// Cancel the timer behind `handle`, if any
pub(crate) fn cancel_task(scheduler: &mut EffectScheduler, handle: &mut Option<ScheduleHandle>) {
    if let Some(handle) = handle.take() {
        scheduler.cancel(handle);
    }
}
