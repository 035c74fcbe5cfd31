pub mod box_categories;
pub mod boxes;
pub mod inventory_items;
pub mod items;
pub mod scores;
pub mod subscriptions;
pub mod users;

pub use box_categories as box_category_entity;
pub use boxes as box_entity;
pub use inventory_items as inventory_entity;
pub use inventory_items::InventoryStatus;
pub use items as item_entity;
pub use items::ItemStatus;
pub use scores as score_entity;
pub use subscriptions as subscription_entity;
pub use users as user_entity;
