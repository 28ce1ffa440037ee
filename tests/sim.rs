
#[cfg(feature = "simulation")]
mod test_closed_loop_on_dc_motor {
    use super::fixtures::test_pid::*;

    use closed_loop_pidf::closed_loop::*;
    use closed_loop_pidf::profile::GainProfileBuilder;
    use closed_loop_pidf::sim;
    use closed_loop_pidf::throttle::FULL_SCALE_THROTTLE;

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra as na;

    const TICK_S: f64 = 0.001;

    fn make_motor() -> sim::DcMotor {
        sim::DcMotor {
            free_speed: 6000.0,
            time_constant: 0.05,
        }
    }

    /// Open-loop check of the plant: a full-scale step from rest follows
    /// ω(t) = ωₘ (1 - e^(-t/τ)).
    #[test]
    fn test_full_scale_step_response() {
        let motor = make_motor();
        let mut x = na::Vector2::<f64>::zeros();

        for _ in 0..100 {
            x = sim::rk4_step(|x| motor.f(x, FULL_SCALE_THROTTLE), x, TICK_S);
        }

        let expected = motor.free_speed * (1.0 - (-0.1 / motor.time_constant).exp());
        assert_relative_eq!(x[1], expected, max_relative = 1e-6);
    }

    #[test]
    fn test_velocity_loop_converges() {
        const TARGET_VELOCITY: f64 = 3000.0;

        let motor = make_motor();
        let profile = GainProfileBuilder::default()
            .p(0.05)
            .i(0.0001)
            .f(f64::from(FULL_SCALE_THROTTLE) / motor.free_speed)
            .integral_zone(500)
            .build()
            .unwrap();

        let mut pid = ClosedLoop::new(profile, sim::MotorDriver::default());
        pid.set_target(TARGET_VELOCITY);

        let mut x = na::Vector2::<f64>::zeros();
        for _ in 0..2000 {
            let output = pid.compute(motor.velocity(x), OutputOptions::default());
            let throttle = pid.driver_mut().apply(output);
            x = sim::rk4_step(|x| motor.f(x, throttle), x, TICK_S);
        }

        assert_abs_diff_eq!(x[1], TARGET_VELOCITY, epsilon = 30.0);
        assert!(pid.state().integral_accumulator().abs() > 0.0);
    }

    #[test]
    fn test_position_loop_settles() {
        const TARGET_POSITION: f64 = 2000.0;

        let motor = make_motor();
        let (pid, mut state) = make_controller(make_profile(1.0, 0.0, 10.0, 0.0));
        let mut driver = sim::MotorDriver::default();
        state.set_target(TARGET_POSITION);

        let mut x = na::Vector2::<f64>::zeros();
        let mut output;
        for _ in 0..3000 {
            (output, state) =
                pid.compute(state, motor.position(x), OutputOptions::default(), &driver);
            let throttle = driver.apply(output);
            x = sim::rk4_step(|x| motor.f(x, throttle), x, TICK_S);
        }

        assert_abs_diff_eq!(x[0], TARGET_POSITION, epsilon = 5.0);
    }

    #[test]
    fn test_enable_while_running_is_bumpless() {
        const RUNNING_THROTTLE: i32 = 400;
        const RAMP: u32 = 2;

        let motor = make_motor();
        let profile = GainProfileBuilder::default()
            .p(0.5)
            .closed_loop_ramp_rate(RAMP)
            .build()
            .unwrap();

        // Spin the motor up open-loop first
        let mut driver = sim::MotorDriver::new(RUNNING_THROTTLE);
        let mut x = na::Vector2::<f64>::zeros();
        for _ in 0..500 {
            x = sim::rk4_step(|x| motor.f(x, driver.applied()), x, TICK_S);
        }

        let (pid, mut state) = make_controller(profile);
        state.set_target(0.0);

        let mut previous = f64::from(RUNNING_THROTTLE);
        for _ in 0..50 {
            let output;
            (output, state) =
                pid.compute(state, motor.velocity(x), OutputOptions::default(), &driver);
            assert!((output - previous).abs() <= f64::from(RAMP));
            previous = output;

            let throttle = driver.apply(output);
            x = sim::rk4_step(|x| motor.f(x, throttle), x, TICK_S);
        }

        // Still decelerating gently toward the new target
        assert_eq!(previous, f64::from(RUNNING_THROTTLE - 100));
    }

    #[test]
    fn test_driver_saturates_commands() {
        let mut driver = sim::MotorDriver::new(5000);
        assert_eq!(driver.applied(), FULL_SCALE_THROTTLE);
        assert_eq!(driver.apply(-4096.0_f32), -FULL_SCALE_THROTTLE);
        assert_eq!(driver.apply(12.4_f64), 12);
    }
}
