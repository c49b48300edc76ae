pub mod router;
pub mod server;
pub mod transport;

pub use chart_core_rs as core;
pub use chart_error_rs as error;
pub use router::traits::Router;
pub use server::Server;
