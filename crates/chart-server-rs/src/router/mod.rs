pub mod capabilities;
pub mod ext;
pub mod traits;
