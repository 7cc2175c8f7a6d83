//! Unattended demo mode
//!
//! Runs the blink effect and, on its own timer, jumps the pulse channel to a
//! random duty and occasionally triggers the fire effect. The orchestrator
//! owns no effect state of its own; it only drives the effects' public
//! operations and leaves their tunables alone.

use embassy_time::Instant;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use super::{
    BlinkEffect, EffectScheduler, FireEffect, PulseEffect, TimerTask, cancel_task, schedule_task,
};
use crate::{
    config::{DemoConfig, clamp_interval, clamp_percent},
    outputs::{OutputBus, Outputs},
    random::RandomSource,
    scheduler::ScheduleHandle,
};

#[derive(Debug, Clone)]
pub struct DemoOrchestrator {
    config: DemoConfig,
    active: bool,
    handle: Option<ScheduleHandle>,
}

impl DemoOrchestrator {
    pub fn new(config: DemoConfig) -> Self {
        Self {
            config: DemoConfig {
                period: clamp_interval(config.period),
                fire_chance_percent: clamp_percent(u32::from(config.fire_chance_percent)),
            },
            active: false,
            handle: None,
        }
    }

    pub fn start<const N: usize>(
        &mut self,
        blink: &mut BlinkEffect<N>,
        scheduler: &mut EffectScheduler,
        now: Instant,
    ) {
        #[cfg(feature = "esp32-log")]
        println!("[DemoOrchestrator.start]");
        blink.start(scheduler, now);
        self.active = true;
        self.handle = schedule_task(scheduler, TimerTask::Demo, self.config.period, now);
    }

    /// Leave demo mode: blink stops and both PWM channels go dark
    pub fn stop<B: OutputBus, const N: usize, const R: usize>(
        &mut self,
        blink: &mut BlinkEffect<N>,
        pulse: &mut PulseEffect,
        fire: &mut FireEffect,
        scheduler: &mut EffectScheduler,
        outputs: &mut Outputs<B, R>,
    ) {
        #[cfg(feature = "esp32-log")]
        println!("[DemoOrchestrator.stop]");
        blink.stop(scheduler, outputs);
        self.active = false;
        cancel_task(scheduler, &mut self.handle);
        pulse.stop(scheduler, outputs);
        fire.stop(scheduler, outputs);
    }

    /// One demo step: random pulse duty, maybe a fire trigger
    pub fn tick<B: OutputBus, Rng: RandomSource, const R: usize>(
        &mut self,
        now: Instant,
        pulse: &mut PulseEffect,
        fire: &mut FireEffect,
        scheduler: &mut EffectScheduler,
        outputs: &mut Outputs<B, R>,
        rng: &mut Rng,
    ) {
        let duty = rng.up_to(u32::from(pulse.max_duty()));
        pulse.set_duty(duty, outputs);

        if rng.below(100) < u32::from(self.config.fire_chance_percent) {
            fire.fire(now, scheduler, outputs);
        }
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }
}
