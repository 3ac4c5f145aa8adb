// Input handler module: device events, hotkeys, and routing to the desktop

pub mod dispatcher;
pub mod source;
pub mod types;

pub use dispatcher::{Dispatcher, Hotkeys, Routed};
pub use source::{InputSource, ScriptedInput, TerminalInput};
pub use types::*;
