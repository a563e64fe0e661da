//! Live capture: listener hand-off, queue and the Pressed-Set engine.

pub mod engine;
pub mod listener;
pub mod queue;

pub use engine::{CellStateChanged, EngineStats, InputStateEngine};
pub use listener::{parse_script, Listener, ManualHandle, ManualListener, ScriptedListener};
pub use queue::{EventQueue, EventSink, InputMessage};
