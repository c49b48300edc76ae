pub mod byte;
pub mod traits;

pub use byte::ByteTransport;
pub use traits::ServerTransport;
