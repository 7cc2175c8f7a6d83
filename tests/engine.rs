mod common;

mod tests {
    use myrtio_light_effects::{
        Channel, Clock, Duration, Engine, Instant, ManualClock, SplitMix64, Status, TimerTask,
    };

    use crate::common::{
        BLINK_PINS, FIRE_PIN, MockBus, PULSE_PIN, STATUS_PIN, channel_map, engine, engine_config,
        step,
    };

    #[test]
    fn test_new_engine_starts_dark_with_status_timer() {
        let clock = ManualClock::new();
        let engine = engine(&clock);
        let bus = engine.outputs().bus();

        for pin in BLINK_PINS {
            assert_eq!(bus.pin(pin), Some(false));
        }
        assert_eq!(bus.duty(PULSE_PIN), Some(0));
        assert_eq!(bus.duty(FIRE_PIN), Some(0));
        assert_eq!(bus.pin(STATUS_PIN), Some(false));

        assert_eq!(engine.scheduler().active_count(), 1);
        assert!(engine.scheduler().is_scheduled(TimerTask::Status.name()));
        assert_eq!(
            engine.status(),
            Status {
                interval_ms: 200,
                chance_percent: 50,
                ..Status::default()
            }
        );
    }

    #[test]
    fn test_tick_reports_sleep_until_next_deadline() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);

        let result = engine.tick(Instant::from_millis(120));
        assert_eq!(result.fired, 0);
        assert_eq!(result.next_deadline, Some(Instant::from_millis(500)));
        assert_eq!(result.sleep_duration, Duration::from_millis(380));

        engine.start_blink();
        let result = engine.tick(Instant::from_millis(150));
        assert_eq!(result.next_deadline, Some(Instant::from_millis(200)));
        assert_eq!(result.sleep_duration, Duration::from_millis(50));
    }

    #[test]
    fn test_late_tick_rearms_timers_from_fire_time() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.start_blink();

        // Both timers are overdue and re-arm from the late tick:
        // blink to 1200, status to 1500
        let result = step(&mut engine, &clock, 1_000);
        assert_eq!(result.fired, 2);
        assert_eq!(result.next_deadline, Some(Instant::from_millis(1_200)));
        assert_eq!(result.sleep_duration, Duration::from_millis(200));

        // Status re-armed to 1500, so only blink is due
        let result = engine.tick(Instant::from_millis(1_300));
        assert_eq!(result.fired, 1);
        assert_eq!(result.next_deadline, Some(Instant::from_millis(1_500)));
        assert_eq!(result.sleep_duration, Duration::from_millis(200));

        let result = engine.tick(Instant::from_millis(1_500));
        assert_eq!(result.fired, 2);
    }

    #[test]
    fn test_poll_uses_engine_clock() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);

        clock.set(500);
        assert_eq!(engine.clock().now(), Instant::from_millis(500));
        assert_eq!(engine.poll().fired, 1);

        // Moving the clock backwards is ignored
        clock.set(100);
        assert_eq!(engine.poll().fired, 0);
    }

    #[test]
    fn test_shift_register_blink_channels() {
        let clock = ManualClock::new();
        let mut map = channel_map();
        map.blink = [0, 1, 2].map(|bit| Channel::shift_register_bit(0, bit));
        let mut config = engine_config();
        config.channels = map;
        config.blink.chance_percent = 100;
        let mut engine: Engine<MockBus, &ManualClock, SplitMix64, 3, 1> =
            Engine::new(MockBus::new(), &clock, SplitMix64::new(9), &config);
        engine.start_blink();

        step(&mut engine, &clock, 200);

        assert_eq!(engine.outputs().bus().register(0), Some(0b0000_0111));
        assert!(!engine.outputs().has_pending());
    }

    #[test]
    fn test_stop_blink_cancels_timer() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.start_blink();
        step(&mut engine, &clock, 200);

        engine.stop_blink();

        assert!(!engine.scheduler().is_scheduled(TimerTask::Blink.name()));
        assert_eq!(step(&mut engine, &clock, 200).fired, 0);
        for pin in BLINK_PINS {
            assert_eq!(engine.outputs().bus().pin(pin), Some(false));
        }
    }
}
