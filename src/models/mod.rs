// Domain models: backend stat rows, chart series handed to the renderer, device context

mod chart;
mod device;
mod stats;

pub use chart::{ChartSeries, Series};
pub use device::{DeviceContext, Location};
pub use stats::{Interval, StatRow};
