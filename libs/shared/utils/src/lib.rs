pub mod clock;
pub mod time;
pub mod test_utils;

pub use clock::{Clock, SystemClock};
