pub mod ports;
pub mod throttle;
pub mod notifications;
pub mod usecases;

pub use ports::*;
pub use throttle::SubmissionThrottle;
pub use notifications::{NotificationCenter, AUTO_DISMISS_AFTER};
