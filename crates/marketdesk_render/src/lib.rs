pub mod chart;
pub mod html;
pub mod page;
pub mod palette;
pub mod scale;
pub mod svg;
pub mod table;

pub use chart::{render_dual_axis_chart, ChartKind, DualAxisChart, DualAxisChartConfig};
pub use page::{Page, Region, RegionContent};
pub use palette::Palette;
pub use table::{StatusRow, StatusTable};
