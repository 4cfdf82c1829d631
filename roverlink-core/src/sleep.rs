use std::time::Duration;

/// A trait for the sleep primitive used between scheduler ticks.
pub trait Sleeper {
    /// Sleep for the specified duration.
    fn sleep(&self, duration: Duration);
}

impl Sleeper for Box<dyn Sleeper> {
    fn sleep(&self, duration: Duration) {
        self.as_ref().sleep(duration);
    }
}

/// A sleeper that uses [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StdSleeper;

impl Sleeper for StdSleeper {
    fn sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        std::thread::sleep(duration);
    }
}

/// A sleeper that spins until the deadline is reached. Trades a busy core
/// for tighter tick timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpinWaitSleeper;

impl Sleeper for SpinWaitSleeper {
    fn sleep(&self, duration: Duration) {
        use std::time::Instant;

        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}
