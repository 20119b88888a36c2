pub mod chart_query_request;
pub mod chart_view;
