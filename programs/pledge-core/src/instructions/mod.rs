pub mod buyback;
pub mod create_pool;
pub mod create_treasury;
pub mod create_vault;
pub mod enforce;
pub mod initialize;
pub mod insurance;
pub mod liquidity;
pub mod platform;
pub mod register_token;
pub mod swap;
pub mod treasury;

pub use buyback::*;
pub use create_pool::*;
pub use create_treasury::*;
pub use create_vault::*;
pub use enforce::*;
pub use initialize::*;
pub use insurance::*;
pub use liquidity::*;
pub use platform::*;
pub use register_token::*;
pub use swap::*;
pub use treasury::*;
