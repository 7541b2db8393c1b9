mod diagnostics;
mod preview;

pub use diagnostics::diagnostics_task;
pub use preview::preview_task;
