pub mod auth;
pub mod charts;
pub mod entries;
pub mod extract;
pub mod habits;
pub mod middleware;
pub mod pages;
pub mod response;
pub mod rest;
pub mod routes;
pub mod state;

// Re-export the router builder to make it easily accessible
// to the binary that starts the web server.
pub use routes::build_router;
