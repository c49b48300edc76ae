pub mod content;
pub mod protocol;
pub mod tool;
pub mod utils;

pub use chart_error_rs as error;
pub use protocol::result::InitializeResult;
pub use tool::Tool;
