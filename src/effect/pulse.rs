//! Triangle-wave "breathing" on a PWM channel
//!
//! Each tick moves the duty by `fade_step` in the current direction and
//! turns around at `0` and at the channel's max duty. A direct
//! [`PulseEffect::set_duty`] shares the same channel; the last write wins and
//! a running wave continues from the overridden duty.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use super::{EffectScheduler, TimerTask, cancel_task, schedule_task};
use crate::{
    channel::Channel,
    config::{PulseConfig, clamp_interval},
    outputs::{OutputBus, Outputs},
    scheduler::ScheduleHandle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Rising,
    Falling,
}

impl Direction {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Rising => Self::Falling,
            Self::Falling => Self::Rising,
        }
    }

    const fn sign(self) -> i32 {
        match self {
            Self::Rising => 1,
            Self::Falling => -1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PulseEffect {
    channel: Channel,
    config: PulseConfig,
    direction: Direction,
    running: bool,
    handle: Option<ScheduleHandle>,
}

impl PulseEffect {
    pub fn new(channel: Channel, config: PulseConfig) -> Self {
        Self {
            channel,
            config: PulseConfig {
                interval: clamp_interval(config.interval),
                fade_step: config.fade_step,
            },
            direction: Direction::Rising,
            running: false,
            handle: None,
        }
    }

    /// Start breathing from the current duty
    pub fn start(&mut self, scheduler: &mut EffectScheduler, now: Instant) {
        #[cfg(feature = "esp32-log")]
        println!(
            "[PulseEffect.start] step {} every {}ms",
            self.config.fade_step,
            self.config.interval.as_millis()
        );
        self.running = true;
        self.handle = schedule_task(scheduler, TimerTask::Pulse, self.config.interval, now);
    }

    /// Stop breathing and switch the channel off
    pub fn stop<B: OutputBus, const R: usize>(
        &mut self,
        scheduler: &mut EffectScheduler,
        outputs: &mut Outputs<B, R>,
    ) {
        self.running = false;
        cancel_task(scheduler, &mut self.handle);
        self.direction = Direction::Rising;
        outputs.write_through(&mut self.channel, 0);
    }

    /// Change the per-tick duty delta without touching the current duty
    pub fn set_fade_step(&mut self, fade_step: i32) {
        self.config.fade_step = fade_step;
    }

    /// Override the duty directly, clamped to the channel's max duty
    pub fn set_duty<B: OutputBus, const R: usize>(
        &mut self,
        duty: u32,
        outputs: &mut Outputs<B, R>,
    ) {
        let duty = u16::try_from(duty).unwrap_or(u16::MAX);
        outputs.write_through(&mut self.channel, duty);
    }

    /// Advance the wave by one step
    pub fn tick<B: OutputBus, const R: usize>(&mut self, outputs: &mut Outputs<B, R>) {
        let max = i32::from(self.channel.full_scale());
        let delta = self.direction.sign().saturating_mul(self.config.fade_step);
        let next = i32::from(self.channel.level())
            .saturating_add(delta)
            .clamp(0, max);
        if next <= 0 || next >= max {
            self.direction = self.direction.flipped();
        }
        outputs.write_through(&mut self.channel, u16::try_from(next).unwrap_or(0));
    }

    pub const fn duty(&self) -> u16 {
        self.channel.level()
    }

    pub const fn max_duty(&self) -> u16 {
        self.channel.full_scale()
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }

    pub const fn fade_step(&self) -> i32 {
        self.config.fade_step
    }

    pub const fn interval(&self) -> Duration {
        self.config.interval
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub const fn channel(&self) -> &Channel {
        &self.channel
    }
}
