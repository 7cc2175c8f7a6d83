//! One-shot "fire" decay on a PWM channel
//!
//! `fire()` jumps to max duty and arms a refresh timer; every refresh
//! recomputes the duty from the time elapsed since the trigger. When the
//! decay is over the effect writes zero, returns to idle and cancels its own
//! timer. Triggering again while decaying restarts from max duty.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use super::{EffectScheduler, TimerTask, cancel_task, schedule_task};
use crate::{
    channel::Channel,
    config::{FireConfig, clamp_interval},
    outputs::{OutputBus, Outputs},
    scheduler::ScheduleHandle,
};

/// Shape of the decay from max duty to zero
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecayCurve {
    /// Straight line from max duty to zero
    Linear,
    /// `e^(-rate * t)` over the normalized decay time
    Exponential { rate: f32 },
}

impl DecayCurve {
    /// Duty after `elapsed` of a decay lasting `duration`
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn duty(self, max_duty: u16, elapsed: Duration, duration: Duration) -> u16 {
        if elapsed >= duration {
            return 0;
        }
        let elapsed = elapsed.as_millis();
        let duration = duration.as_millis();
        match self {
            Self::Linear => {
                // Integer round-half-up of max * (duration - elapsed) / duration
                let scaled = u64::from(max_duty) * (duration - elapsed);
                ((scaled * 2 + duration) / (duration * 2)) as u16
            }
            Self::Exponential { rate } => {
                let progress = elapsed as f32 / duration as f32;
                let level = libm::expf(-rate.max(0.0) * progress);
                let duty = libm::roundf(f32::from(max_duty) * level.clamp(0.0, 1.0));
                (duty as u16).min(max_duty)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireState {
    Idle,
    Decaying { started_at: Instant },
}

#[derive(Debug, Clone)]
pub struct FireEffect {
    channel: Channel,
    config: FireConfig,
    state: FireState,
    handle: Option<ScheduleHandle>,
}

impl FireEffect {
    pub const fn new(channel: Channel, config: FireConfig) -> Self {
        Self {
            channel,
            config: FireConfig {
                refresh: clamp_interval(config.refresh),
                ..config
            },
            state: FireState::Idle,
            handle: None,
        }
    }

    /// Trigger the decay; a running decay restarts from max duty
    pub fn fire<B: OutputBus, const R: usize>(
        &mut self,
        now: Instant,
        scheduler: &mut EffectScheduler,
        outputs: &mut Outputs<B, R>,
    ) {
        #[cfg(feature = "esp32-log")]
        println!("[FireEffect.fire] at {}ms", now.as_millis());
        self.state = FireState::Decaying { started_at: now };
        let peak = self.channel.full_scale();
        outputs.write_through(&mut self.channel, peak);
        self.handle = schedule_task(scheduler, TimerTask::Fire, self.config.refresh, now);
    }

    /// Recompute the duty; ends the decay once its duration has passed
    pub fn tick<B: OutputBus, const R: usize>(
        &mut self,
        now: Instant,
        scheduler: &mut EffectScheduler,
        outputs: &mut Outputs<B, R>,
    ) {
        let FireState::Decaying { started_at } = self.state else {
            cancel_task(scheduler, &mut self.handle);
            return;
        };

        let elapsed = now.saturating_duration_since(started_at);
        if elapsed >= self.config.duration {
            self.stop(scheduler, outputs);
            return;
        }

        let duty = self
            .config
            .curve
            .duty(self.channel.full_scale(), elapsed, self.config.duration);
        outputs.write_through(&mut self.channel, duty);
    }

    /// Abort any decay and switch the channel off
    pub fn stop<B: OutputBus, const R: usize>(
        &mut self,
        scheduler: &mut EffectScheduler,
        outputs: &mut Outputs<B, R>,
    ) {
        self.state = FireState::Idle;
        cancel_task(scheduler, &mut self.handle);
        outputs.write_through(&mut self.channel, 0);
    }

    pub const fn state(&self) -> FireState {
        self.state
    }

    pub const fn is_active(&self) -> bool {
        matches!(self.state, FireState::Decaying { .. })
    }

    pub const fn duty(&self) -> u16 {
        self.channel.level()
    }

    pub const fn duration(&self) -> Duration {
        self.config.duration
    }

    pub const fn channel(&self) -> &Channel {
        &self.channel
    }

    pub const fn handle(&self) -> Option<ScheduleHandle> {
        self.handle
    }
}
