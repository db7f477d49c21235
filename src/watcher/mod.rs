pub mod controller;
pub mod email;
pub mod loop_worker;
pub mod state;

pub use controller::WatcherController;
pub use email::{EmailMemory, EMAIL_KEY};
pub use loop_worker::{apply_poll, PollTiming};
pub use state::{ReservationBaseline, StatusTransition, WatcherState, WatcherStatus};
