//! Named timer registry.
//!
//! Portable timing without async/await or hardware timers: the host calls
//! [`Scheduler::tick`] with the current time and every due timer invokes the
//! callback once. Timers are identified by name, so registering a name again
//! replaces the previous timer instead of adding a second one.
//!
//! Periodic timers are re-armed from the moment they actually fired. A timer
//! that is overdue by several periods fires once and is then due one period
//! later, never in a catch-up burst.

use core::fmt;

use embassy_time::{Duration, Instant};
use heapless::Vec;

#[cfg(feature = "esp32-log")]
use esp_println::println;

/// Opaque token for one registration.
///
/// A handle outlives its timer: after cancellation or replacement it simply
/// stops matching anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleHandle {
    slot: u8,
    serial: u64,
}

/// Returned when every slot is taken by another name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerFull;

impl fmt::Display for SchedulerFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no free timer slot")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    /// Fires every `period`, measured from the previous fire
    Periodic { period: Duration },
    /// Fires once and unregisters itself
    Once,
}

#[derive(Debug, Clone)]
struct TimerEntry<T> {
    name: &'static str,
    kind: ScheduleKind,
    task: T,
    /// Registration order, also used to validate handles
    serial: u64,
    /// Time of the last fire, or of registration before the first one
    anchor: Instant,
    next_due: Instant,
}

/// Fixed-capacity timer registry carrying a `T` payload per timer.
pub struct Scheduler<T: Copy, const N: usize> {
    slots: [Option<TimerEntry<T>>; N],
    next_serial: u64,
}

impl<T: Copy, const N: usize> Default for Scheduler<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize> Scheduler<T, N> {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            slots: [const { None }; N],
            next_serial: 0,
        }
    }

    /// Register a timer firing every `period`, first at `now + period`.
    ///
    /// Replaces any timer registered under the same name.
    pub fn schedule_periodic(
        &mut self,
        name: &'static str,
        period: Duration,
        now: Instant,
        task: T,
    ) -> Result<ScheduleHandle, SchedulerFull> {
        self.register(name, ScheduleKind::Periodic { period }, now, now + period, task)
    }

    /// Register a timer firing once at `now + delay`.
    ///
    /// Replaces any timer registered under the same name.
    pub fn schedule_once(
        &mut self,
        name: &'static str,
        delay: Duration,
        now: Instant,
        task: T,
    ) -> Result<ScheduleHandle, SchedulerFull> {
        self.register(name, ScheduleKind::Once, now, now + delay, task)
    }

    /// Stop a timer. Stale or unknown handles are ignored.
    pub fn cancel(&mut self, handle: ScheduleHandle) {
        if let Some(slot) = self.slot_of(handle) {
            self.slots[slot] = None;
        }
    }

    /// Re-register a periodic timer with a new period.
    ///
    /// The new timer keeps the name and payload and is anchored on the last
    /// fire of the old one, so the next fire happens at
    /// `last_fire + period` rather than a full period from now. Returns
    /// `None` when the handle is stale or the timer is a one-shot.
    pub fn retime(&mut self, handle: ScheduleHandle, period: Duration) -> Option<ScheduleHandle> {
        let slot = self.slot_of(handle)?;
        let entry = self.slots[slot].take()?;
        if entry.kind == ScheduleKind::Once {
            self.slots[slot] = Some(entry);
            return None;
        }

        #[cfg(feature = "esp32-log")]
        println!(
            "[Scheduler.retime] '{}' now every {}ms",
            entry.name,
            period.as_millis()
        );

        let serial = self.take_serial();
        self.slots[slot] = Some(TimerEntry {
            kind: ScheduleKind::Periodic { period },
            serial,
            next_due: entry.anchor + period,
            ..entry
        });
        Some(Self::handle(slot, serial))
    }

    /// Whether the handle still refers to a registered timer
    pub fn is_active(&self, handle: ScheduleHandle) -> bool {
        self.slot_of(handle).is_some()
    }

    /// Whether a timer is registered under `name`
    pub fn is_scheduled(&self, name: &str) -> bool {
        self.slot_named(name).is_some()
    }

    /// Number of registered timers
    pub fn active_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Earliest due time over all timers
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.iter().flatten().map(|entry| entry.next_due).min()
    }

    /// Fire every timer due at `now`, in registration order.
    ///
    /// The callback receives the scheduler so that it can cancel or
    /// re-register timers. A timer cancelled by an earlier callback in the
    /// same tick does not fire; timers registered during the tick wait for
    /// the next one. Returns the number of callbacks invoked.
    pub fn tick<F>(&mut self, now: Instant, mut callback: F) -> usize
    where
        F: FnMut(&mut Self, T),
    {
        let mut due: Vec<(u64, usize), N> = Vec::new();
        for (slot, entry) in self.slots.iter().enumerate() {
            if let Some(entry) = entry {
                if entry.next_due <= now {
                    // Capacity equals the slot count
                    let _ = due.push((entry.serial, slot));
                }
            }
        }
        due.sort_unstable_by_key(|&(serial, _)| serial);

        let mut fired = 0;
        for (serial, slot) in due {
            let Some(task) = self.arm_next(slot, serial, now) else {
                continue;
            };
            callback(self, task);
            fired += 1;
        }
        fired
    }

    /// Advance a due timer past `now` and return its payload
    fn arm_next(&mut self, slot: usize, serial: u64, now: Instant) -> Option<T> {
        let entry = self.slots[slot].as_mut()?;
        if entry.serial != serial {
            return None;
        }
        let task = entry.task;
        let kind = entry.kind;
        match kind {
            ScheduleKind::Periodic { period } => {
                entry.anchor = now;
                entry.next_due = now + period;
            }
            ScheduleKind::Once => self.slots[slot] = None,
        }
        Some(task)
    }

    fn register(
        &mut self,
        name: &'static str,
        kind: ScheduleKind,
        now: Instant,
        next_due: Instant,
        task: T,
    ) -> Result<ScheduleHandle, SchedulerFull> {
        if let Some(previous) = self.slot_named(name) {
            self.slots[previous] = None;
        }
        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            #[cfg(feature = "esp32-log")]
            println!("[Scheduler.register] no slot left for '{}'", name);
            return Err(SchedulerFull);
        };

        let serial = self.take_serial();
        self.slots[slot] = Some(TimerEntry {
            name,
            kind,
            task,
            serial,
            anchor: now,
            next_due,
        });
        Ok(Self::handle(slot, serial))
    }

    fn slot_of(&self, handle: ScheduleHandle) -> Option<usize> {
        let slot = usize::from(handle.slot);
        match self.slots.get(slot) {
            Some(Some(entry)) if entry.serial == handle.serial => Some(slot),
            _ => None,
        }
    }

    fn slot_named(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|entry| entry.as_ref().is_some_and(|entry| entry.name == name))
    }

    const fn take_serial(&mut self) -> u64 {
        let serial = self.next_serial;
        // 64 bits never wrap at any realistic registration rate
        self.next_serial += 1;
        serial
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn handle(slot: usize, serial: u64) -> ScheduleHandle {
        ScheduleHandle {
            slot: slot as u8,
            serial,
        }
    }
}
