//! Chart, HTML and terminal presentation of forecast reports.

pub mod chart;
pub mod html;
pub mod text;

pub use chart::price_chart_svg;
pub use html::{render_page, FormState, PageContent};
