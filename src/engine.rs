//! Effects engine - the main orchestrator
//!
//! Owns the output stage, the scheduler and every effect. The host loop
//! calls [`Engine::tick`] (or [`Engine::poll`]) as often as it can and may
//! sleep for the returned [`TickResult::sleep_duration`] in between; control
//! operations are plain method calls on the same thread.
//!
//! ```ignore
//! let mut engine = Engine::new(bus, SystemClock, SplitMix64::new(seed), &config);
//!
//! loop {
//!     engine.drain(&commands);
//!     let result = engine.poll();
//!     engine.publish(&STATUS);
//!
//!     // Platform-specific sleep
//!     sleep_ms(result.sleep_duration.as_millis());
//! }
//! ```

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::control::{Command, CommandReceiver, Status, StatusBoard};
use crate::effect::{
    BlinkEffect, DemoOrchestrator, EffectScheduler, FireEffect, PulseEffect, StatusIndicator,
    TimerTask,
};
use crate::outputs::{OutputBus, Outputs};
use crate::random::RandomSource;

/// Result of one engine tick
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// Number of timer callbacks that ran
    pub fired: usize,
    /// Earliest due time of any timer
    pub next_deadline: Option<Instant>,
    /// How long the host may sleep before the next tick (zero if behind)
    pub sleep_duration: Duration,
}

/// Effects engine over a bus `B`, clock `C` and random source `R`.
///
/// `CHANNELS` is the number of blink channels, `REGISTERS` the number of
/// shift registers behind the bus.
pub struct Engine<B, C, R, const CHANNELS: usize, const REGISTERS: usize>
where
    B: OutputBus,
    C: Clock,
    R: RandomSource,
{
    // External dependencies
    clock: C,
    rng: R,
    outputs: Outputs<B, REGISTERS>,
    scheduler: EffectScheduler,

    // Effects
    blink: BlinkEffect<CHANNELS>,
    pulse: PulseEffect,
    fire: FireEffect,
    demo: DemoOrchestrator,
    status: StatusIndicator,
}

impl<B, C, R, const CHANNELS: usize, const REGISTERS: usize> Engine<B, C, R, CHANNELS, REGISTERS>
where
    B: OutputBus,
    C: Clock,
    R: RandomSource,
{
    /// Bind channels, switch every output off and start the status indicator
    pub fn new(bus: B, clock: C, rng: R, config: &EngineConfig<CHANNELS>) -> Self {
        let channels = config.channels;
        let mut engine = Self {
            clock,
            rng,
            outputs: Outputs::new(bus),
            scheduler: EffectScheduler::new(),
            blink: BlinkEffect::new(channels.blink, config.blink),
            pulse: PulseEffect::new(channels.pulse, config.pulse),
            fire: FireEffect::new(channels.fire, config.fire),
            demo: DemoOrchestrator::new(config.demo),
            status: StatusIndicator::new(channels.status, config.status),
        };
        engine.reset_outputs();

        let now = engine.clock.now();
        engine.status.start(&mut engine.scheduler, now);
        engine
    }

    /// Run every timer due at `now`
    pub fn tick(&mut self, now: Instant) -> TickResult {
        let Self {
            rng,
            outputs,
            scheduler,
            blink,
            pulse,
            fire,
            demo,
            status,
            ..
        } = self;

        let fired = scheduler.tick(now, |scheduler, task| match task {
            TimerTask::Blink => blink.tick(outputs, rng),
            TimerTask::Pulse => pulse.tick(outputs),
            TimerTask::Fire => fire.tick(now, scheduler, outputs),
            TimerTask::Demo => demo.tick(now, pulse, fire, scheduler, outputs, rng),
            TimerTask::Status => status.tick(outputs),
        });

        let next_deadline = self.scheduler.next_deadline();
        let sleep_duration = next_deadline
            .map(|deadline| deadline.saturating_duration_since(now))
            .unwrap_or(Duration::from_millis(0));

        TickResult {
            fired,
            next_deadline,
            sleep_duration,
        }
    }

    /// Tick at the clock's current time
    pub fn poll(&mut self) -> TickResult {
        let now = self.clock.now();
        self.tick(now)
    }

    pub fn start_blink(&mut self) {
        let now = self.clock.now();
        self.blink.start(&mut self.scheduler, now);
    }

    pub fn stop_blink(&mut self) {
        self.blink.stop(&mut self.scheduler, &mut self.outputs);
    }

    /// Override the pulse duty, clamped to the channel's max duty
    pub fn set_fade(&mut self, duty: u32) {
        self.pulse.set_duty(duty, &mut self.outputs);
    }

    /// Blink interval in milliseconds
    pub fn set_interval(&mut self, interval_ms: u32) {
        let now = self.clock.now();
        self.blink.set_interval(
            Duration::from_millis(u64::from(interval_ms)),
            &mut self.scheduler,
            now,
        );
    }

    /// Blink flip chance, clamped to 0-100
    pub fn set_chance(&mut self, percent: u32) {
        self.blink.set_chance(percent);
    }

    pub fn set_fade_step(&mut self, fade_step: i32) {
        self.pulse.set_fade_step(fade_step);
    }

    pub fn start_pulse(&mut self) {
        let now = self.clock.now();
        self.pulse.start(&mut self.scheduler, now);
    }

    pub fn stop_pulse(&mut self) {
        self.pulse.stop(&mut self.scheduler, &mut self.outputs);
    }

    pub fn fire(&mut self) {
        let now = self.clock.now();
        self.fire.fire(now, &mut self.scheduler, &mut self.outputs);
    }

    pub fn start_demo(&mut self) {
        let now = self.clock.now();
        self.demo.start(&mut self.blink, &mut self.scheduler, now);
    }

    pub fn stop_demo(&mut self) {
        self.demo.stop(
            &mut self.blink,
            &mut self.pulse,
            &mut self.fire,
            &mut self.scheduler,
            &mut self.outputs,
        );
    }

    pub fn notify_peer_connected(&mut self, connected: bool) {
        self.status.set_peer_connected(connected);
    }

    pub fn status(&self) -> Status {
        Status {
            blinking: self.blink.is_enabled(),
            duty: self.pulse.duty(),
            interval_ms: self.blink.interval().as_millis(),
            chance_percent: self.blink.chance_percent(),
            pulsing: self.pulse.is_running(),
            fire_active: self.fire.is_active(),
            demo_active: self.demo.is_active(),
            peer_connected: self.status.peer_connected(),
        }
    }

    /// Execute one control-plane command and report the resulting status
    pub fn apply(&mut self, command: Command) -> Status {
        #[cfg(feature = "esp32-log")]
        println!("[Engine.apply] {}", command.as_str());
        match command {
            Command::StartBlink => self.start_blink(),
            Command::StopBlink => self.stop_blink(),
            Command::SetFade(duty) => self.set_fade(duty),
            Command::SetInterval(interval_ms) => self.set_interval(interval_ms),
            Command::SetChance(percent) => self.set_chance(percent),
            Command::SetFadeStep(fade_step) => self.set_fade_step(fade_step),
            Command::StartPulse => self.start_pulse(),
            Command::StopPulse => self.stop_pulse(),
            Command::Fire => self.fire(),
            Command::StartDemo => self.start_demo(),
            Command::StopDemo => self.stop_demo(),
            Command::GetStatus => {}
            Command::PeerConnected(connected) => self.notify_peer_connected(connected),
        }
        self.status()
    }

    /// Apply every queued command (non-blocking); returns how many ran
    pub fn drain<const SIZE: usize>(&mut self, commands: &CommandReceiver<'_, SIZE>) -> usize {
        let mut applied = 0;
        while let Ok(command) = commands.try_receive() {
            self.apply(command);
            applied += 1;
        }
        applied
    }

    /// Mirror the current status for readers on other contexts
    pub fn publish(&self, board: &StatusBoard) {
        board.publish(self.status());
    }

    pub const fn blink(&self) -> &BlinkEffect<CHANNELS> {
        &self.blink
    }

    pub const fn pulse(&self) -> &PulseEffect {
        &self.pulse
    }

    pub const fn fire_effect(&self) -> &FireEffect {
        &self.fire
    }

    pub const fn demo(&self) -> &DemoOrchestrator {
        &self.demo
    }

    pub const fn status_indicator(&self) -> &StatusIndicator {
        &self.status
    }

    pub const fn outputs(&self) -> &Outputs<B, REGISTERS> {
        &self.outputs
    }

    pub const fn scheduler(&self) -> &EffectScheduler {
        &self.scheduler
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Drive every bound channel to off and latch the shift registers
    fn reset_outputs(&mut self) {
        self.blink.stop(&mut self.scheduler, &mut self.outputs);
        self.pulse.stop(&mut self.scheduler, &mut self.outputs);
        self.fire.stop(&mut self.scheduler, &mut self.outputs);
        self.status.switch_off(&mut self.outputs);
    }
}
