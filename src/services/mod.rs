pub mod auth_service;
pub mod box_category_service;
pub mod box_service;
pub mod game_service;
pub mod inventory_service;
pub mod item_service;
pub mod subscription_service;

pub use auth_service::*;
pub use box_category_service::*;
pub use box_service::*;
pub use game_service::*;
pub use inventory_service::*;
pub use item_service::*;
pub use subscription_service::*;
