//! Roster server: the in-memory REST employee resource and the CLI commands
//! that drive an [`products_hr::EmployeeStore`] against it.

pub mod cli;
pub mod config;
pub mod http;
pub mod resource;

pub use config::AppConfig;
pub use http::{AppState, ServeConfig, build_router, serve, serve_on};
pub use resource::{EmployeeResource, IncomingEmployee, load_seed};
