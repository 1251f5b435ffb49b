pub mod cancellation;
pub mod countdown;
pub mod input;
pub mod signals;

pub use cancellation::CancellationSignal;
pub use countdown::{suspend_spinner, CountdownTimer, StopFlag};
pub use input::CancellableInput;
pub use signals::spawn_signal_listener;
