pub use application::*;
pub use request::AppExtractor;
pub use response::ApiResponse;
pub use utils::*;

pub mod application;
pub mod error;
pub mod request;
pub mod response;
pub mod utils;
