pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_catalog;
mod m20250903_000001_create_game_and_subscriptions;
mod m20250905_000001_backfill_item_exchangeable;
mod m20250908_000001_create_users_and_inventory;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_catalog::Migration),
            Box::new(m20250903_000001_create_game_and_subscriptions::Migration),
            Box::new(m20250905_000001_backfill_item_exchangeable::Migration),
            Box::new(m20250908_000001_create_users_and_inventory::Migration),
        ]
    }
}
