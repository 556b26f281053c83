pub mod db;
pub mod png_chart;

pub use db::DbAdapter;
pub use png_chart::PngChartAdapter;
