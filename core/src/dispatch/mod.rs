//! Event delegation: one root listener resolves each interaction to a named
//! action and runs the matching handler from a static table.

pub mod debounce;
pub mod dispatcher;
pub mod interaction;
pub mod outcome;

pub use debounce::{Debouncer, DEFAULT_QUIET_PERIOD};
pub use dispatcher::{Dispatch, Dispatcher, Handler};
pub use interaction::{Element, Interaction, Payload, ACTION_ATTR};
pub use outcome::{Effect, NoticeLevel, Notification, Outcome, SAVE_FAILED};
