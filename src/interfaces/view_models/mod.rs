pub mod dashboard_view_model;

pub use dashboard_view_model::{
    AdvantageView, ChartBar, ChartView, DashboardView, DashboardViewModel, RateHeadline,
    format_rate,
};
