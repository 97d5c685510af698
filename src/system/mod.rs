pub(crate) mod banner;
pub(crate) mod logger;
pub(crate) mod shutdown_handlers;
pub(crate) mod summary_output;

pub(crate) use summary_output::{RunReport, progress_line, summary_lines};
