//! Vaccine appointment polling: provider checkers, their HTTP sessions and
//! the engine that runs one cancellable loop per target.

pub mod checker;
pub mod cvs;
pub mod engine;
pub mod error;
pub mod jefferson;
pub mod rite_aid;
pub mod session;
pub mod sink;
pub mod targets;

pub use checker::{Availability, Checker, PollState};
pub use cvs::CvsChecker;
pub use engine::{Target, TargetSet};
pub use error::CheckError;
pub use jefferson::JeffersonChecker;
pub use rite_aid::{PhillyMode, RiteAidChecker};
pub use session::{SessionClient, SessionOptions};
pub use sink::{LocationsSink, LogSink, NotificationSink, Sinks, TracingLogSink};
pub use targets::{build_checker, planned_providers, start_targets, Provider};
