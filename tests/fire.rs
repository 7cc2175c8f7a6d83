mod common;

mod tests {
    use myrtio_light_effects::{
        DecayCurve, Duration, FireState, Instant, ManualClock, TimerTask,
    };

    use crate::common::{FIRE_PIN, MAX_DUTY, engine, engine_config, engine_with, run_for, step};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_fire_jumps_to_max_duty() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        step(&mut engine, &clock, 100);

        engine.fire();

        assert_eq!(engine.fire_effect().duty(), MAX_DUTY);
        assert_eq!(engine.outputs().bus().duty(FIRE_PIN), Some(MAX_DUTY));
        assert_eq!(
            engine.fire_effect().state(),
            FireState::Decaying {
                started_at: Instant::from_millis(100)
            }
        );
        assert!(engine.status().fire_active);
    }

    #[test]
    fn test_decay_is_monotonic_and_ends_at_zero() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        step(&mut engine, &clock, 100);
        engine.fire();

        let mut previous = MAX_DUTY;
        for refresh in 1..50 {
            step(&mut engine, &clock, 20);
            let duty = engine.fire_effect().duty();
            assert!(duty <= previous, "duty rose at refresh {refresh}");
            assert!(duty > 0, "decay ended early at refresh {refresh}");
            if refresh == 25 {
                assert_eq!(duty, MAX_DUTY / 2);
            }
            previous = duty;
        }

        step(&mut engine, &clock, 20);
        assert_eq!(engine.fire_effect().duty(), 0);
        assert_eq!(engine.fire_effect().state(), FireState::Idle);
        assert_eq!(engine.outputs().bus().duty(FIRE_PIN), Some(0));
    }

    #[test]
    fn test_finished_decay_cancels_its_own_timer() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.fire();
        assert!(engine.scheduler().is_scheduled(TimerTask::Fire.name()));

        run_for(&mut engine, &clock, 1_000, 20);

        assert!(!engine.scheduler().is_scheduled(TimerTask::Fire.name()));
        assert_eq!(engine.fire_effect().handle(), None);
        // Only the status indicator is left
        assert_eq!(engine.scheduler().active_count(), 1);
    }

    #[test]
    fn test_late_tick_past_duration_goes_straight_to_zero() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.fire();

        step(&mut engine, &clock, 5_000);

        assert_eq!(engine.fire_effect().duty(), 0);
        assert!(!engine.fire_effect().is_active());
    }

    #[test]
    fn test_retrigger_restarts_from_max() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        step(&mut engine, &clock, 100);
        engine.fire();
        run_for(&mut engine, &clock, 400, 20);
        assert!(engine.fire_effect().duty() < MAX_DUTY);

        engine.fire();

        assert_eq!(engine.fire_effect().duty(), MAX_DUTY);
        assert_eq!(engine.scheduler().active_count(), 2);

        // The first trigger would have ended at 1100ms
        run_for(&mut engine, &clock, 600, 20);
        assert!(engine.fire_effect().is_active());
        assert_eq!(engine.fire_effect().duty(), 400);

        run_for(&mut engine, &clock, 400, 20);
        assert_eq!(engine.fire_effect().duty(), 0);
        assert!(!engine.fire_effect().is_active());
    }

    #[test]
    fn test_exponential_curve_decays_to_zero() {
        let clock = ManualClock::new();
        let mut config = engine_config();
        config.fire.curve = DecayCurve::Exponential { rate: 4.0 };
        let mut engine = engine_with(&clock, config);
        engine.fire();

        step(&mut engine, &clock, 20);
        let early = engine.fire_effect().duty();
        run_for(&mut engine, &clock, 480, 20);
        let halfway = engine.fire_effect().duty();

        assert!(early < MAX_DUTY);
        assert!(halfway < MAX_DUTY / 2, "exponential decay should be below linear");
        assert!(halfway > 0);

        run_for(&mut engine, &clock, 500, 20);
        assert_eq!(engine.fire_effect().duty(), 0);
    }

    #[test]
    fn test_linear_curve_values() {
        let curve = DecayCurve::Linear;

        assert_eq!(curve.duty(1023, ms(0), ms(1000)), 1023);
        assert_eq!(curve.duty(1023, ms(500), ms(1000)), 512);
        assert_eq!(curve.duty(1000, ms(999), ms(1000)), 1);
        assert_eq!(curve.duty(1000, ms(1000), ms(1000)), 0);
        assert_eq!(curve.duty(1000, ms(4000), ms(1000)), 0);
    }

    #[test]
    fn test_exponential_curve_values() {
        let curve = DecayCurve::Exponential { rate: 5.0 };

        assert_eq!(curve.duty(1000, ms(0), ms(1000)), 1000);
        let mut previous = 1000;
        for elapsed in (0..1000).step_by(10) {
            let duty = curve.duty(1000, ms(elapsed), ms(1000));
            assert!(duty <= previous);
            previous = duty;
        }
        assert_eq!(curve.duty(1000, ms(1000), ms(1000)), 0);

        // A flat curve holds max duty until the end
        let flat = DecayCurve::Exponential { rate: 0.0 };
        assert_eq!(flat.duty(1000, ms(900), ms(1000)), 1000);
    }
}
