pub mod ask;
pub mod cancel;

pub use ask::{run_ask, AskInput, AskOutput};
