use std::num::IntErrorKind;
use std::time::Duration;

use bittrack_primitives::DurationSinceUnixEpoch;

use crate::clock::{self, Time};

#[allow(clippy::module_name_repetitions)]
pub struct StoppedClock {}

/// Trait for the extra operations a stopped clock supports: tests move the
/// fixed time around instead of waiting for real time to pass.
#[allow(clippy::module_name_repetitions)]
pub trait Stopped: Time {
    /// It sets the clock to a given time.
    fn local_set(unix_time: &DurationSinceUnixEpoch);

    /// It sets the clock back to the Unix Epoch.
    fn local_reset() {
        Self::local_set(&DurationSinceUnixEpoch::ZERO);
    }

    /// It adds a `Duration` to the clock.
    ///
    /// # Errors
    ///
    /// Will return `IntErrorKind::PosOverflow` if `duration` would overflow
    /// the internal `Duration`.
    fn local_add(duration: &Duration) -> Result<(), IntErrorKind>;

    /// It subtracts a `Duration` from the clock.
    ///
    /// # Errors
    ///
    /// Will return `IntErrorKind::NegOverflow` if `duration` would underflow
    /// the internal `Duration`.
    fn local_sub(duration: &Duration) -> Result<(), IntErrorKind>;
}

impl Time for clock::Stopped {
    fn now() -> DurationSinceUnixEpoch {
        detail::FIXED_TIME.with(|time| *time.borrow())
    }
}

impl Stopped for clock::Stopped {
    fn local_set(unix_time: &DurationSinceUnixEpoch) {
        detail::FIXED_TIME.with(|time| {
            *time.borrow_mut() = *unix_time;
        });
    }

    fn local_add(duration: &Duration) -> Result<(), IntErrorKind> {
        detail::FIXED_TIME.with(|time| {
            let current = *time.borrow();
            match current.checked_add(*duration) {
                Some(advanced) => {
                    *time.borrow_mut() = advanced;
                    Ok(())
                }
                None => Err(IntErrorKind::PosOverflow),
            }
        })
    }

    fn local_sub(duration: &Duration) -> Result<(), IntErrorKind> {
        detail::FIXED_TIME.with(|time| {
            let current = *time.borrow();
            match current.checked_sub(*duration) {
                Some(rewound) => {
                    *time.borrow_mut() = rewound;
                    Ok(())
                }
                None => Err(IntErrorKind::NegOverflow),
            }
        })
    }
}

mod detail {
    use std::cell::RefCell;

    use bittrack_primitives::DurationSinceUnixEpoch;

    thread_local! {
        pub static FIXED_TIME: RefCell<DurationSinceUnixEpoch> = const { RefCell::new(DurationSinceUnixEpoch::ZERO) };
    }
}
