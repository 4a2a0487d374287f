pub mod attendance;
pub mod employee;
pub mod role;
pub mod shaped;
pub mod slot;
pub mod time_summary;

pub use attendance::{AttendanceEntry, CheckEvent};
pub use employee::{EmployeeRecord, RosterEntry};
pub use role::Role;
pub use shaped::Shaped;
pub use slot::Slot;
pub use time_summary::{default_time_summary, summary_is_set};
