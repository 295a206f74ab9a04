mod detail_view;
mod popup;
mod relative_time;

pub use detail_view::{CoordinateLines, DetailPanel, RankedLine};
pub use popup::{unwrap_longitude, Popup};
pub use relative_time::humanize;
