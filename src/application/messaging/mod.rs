//! Message handling - Fan-out dispatch, trigger parsing and event reporting

pub mod dispatcher;
pub mod observer;
pub mod parser;

pub use dispatcher::{DispatchCore, DispatchReport, Outcome};
pub use observer::{CoreEvent, Observer, RecordingObserver, TracingObserver};
pub use parser::{Trigger, COMMAND_PREFIX};
