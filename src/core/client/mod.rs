pub mod query_backend;
