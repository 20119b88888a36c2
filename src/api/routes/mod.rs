pub mod chart_routes;
