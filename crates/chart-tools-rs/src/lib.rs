pub mod chart;
pub mod router;

pub use chart_core_rs as core;
pub use chart_error_rs as error;
pub use chart_server_rs as server;
pub use router::QuickChartRouter;
