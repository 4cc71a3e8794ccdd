pub use self::event_loop::{EventLoop, TuiEvent};

mod event_loop;
