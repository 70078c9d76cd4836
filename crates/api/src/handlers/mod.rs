pub mod common;
pub mod proxy;
pub mod stats;

pub use common::{not_found, ErrorResponse};
pub use proxy::proxy;
pub use stats::stats;
