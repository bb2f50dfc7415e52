pub mod stellar;
pub mod traits;
