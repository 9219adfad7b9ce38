pub mod arm;
pub mod episode;
pub mod errors;
pub mod scripted;

pub use arm::*;
pub use episode::*;
pub use errors::*;
pub use scripted::*;
