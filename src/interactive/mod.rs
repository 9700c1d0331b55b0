/// Terminal event source
pub mod console;
/// Poll/act loop
pub mod event_loop;
pub use console::ConsoleSource;
pub use event_loop::{EventLoop, EventSource, LoopState, LoopStats};
