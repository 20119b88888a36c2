pub mod bucket_size_selector;
pub mod chart_session;
pub mod chart_view_builder;
pub mod diurnal_splitter;
pub mod series_reshaper;
pub mod time_rounder;
pub mod window_label_formatter;
pub mod window_navigator;
