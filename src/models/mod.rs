pub mod auth;
pub mod box_category;
pub mod common;
pub mod game;
pub mod inventory;
pub mod item;
pub mod mystery_box;
pub mod pagination;
pub mod subscription;

pub use auth::*;
pub use box_category::*;
pub use common::*;
pub use game::*;
pub use inventory::*;
pub use item::*;
pub use mystery_box::*;
pub use pagination::*;
pub use subscription::*;
