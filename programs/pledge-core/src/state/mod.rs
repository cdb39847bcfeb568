pub mod insurance;
pub mod platform;
pub mod pool;
pub mod protocol;
pub mod registry;
pub mod treasury;
pub mod vault;

pub use insurance::*;
pub use platform::*;
pub use pool::*;
pub use protocol::*;
pub use registry::*;
pub use treasury::*;
pub use vault::*;
