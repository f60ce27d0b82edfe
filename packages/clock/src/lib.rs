//! Time for the Bittrack tracker.
//!
//! Peer expiry is wall-clock driven, so every timestamp the tracker takes
//! goes through a clock type instead of `SystemTime` directly. Production
//! code uses the [`clock::Working`] clock; tests use the [`clock::Stopped`]
//! clock, which always returns the same instant until a test moves it.
//!
//! Each crate that needs a clock declares its own alias, switching on
//! `cfg(test)`:
//!
//! ```rust
//! use bittrack_clock::clock;
//!
//! #[cfg(not(test))]
//! pub type CurrentClock = clock::Working;
//!
//! #[cfg(test)]
//! pub type CurrentClock = clock::Stopped;
//! ```
pub mod clock;

/// Working version, for production.
#[cfg(not(test))]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Stopped;

#[cfg(test)]
mod tests {
    use std::any::TypeId;

    use crate::clock::{Stopped, Time, Working};
    use crate::CurrentClock;

    #[test]
    fn it_should_default_to_the_stopped_clock_when_testing() {
        assert_eq!(TypeId::of::<CurrentClock>(), TypeId::of::<Stopped>());
    }

    #[test]
    fn it_should_have_different_times_on_each_clock() {
        assert_ne!(Stopped::now(), Working::now());
    }
}
