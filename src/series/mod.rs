// Pure transforms from backend stat rows to chart series. No I/O, no suspension.

mod labels;
pub mod liveness;
pub mod throughput;

pub use labels::{LabelTimezone, ordinal_day_label, time_of_day_label};
pub use liveness::liveness_series;
pub use throughput::throughput_series;
