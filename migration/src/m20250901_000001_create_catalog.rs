use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

/// Box Categories (盲盒分类)
#[derive(DeriveIden)]
enum BoxCategories {
    Table,
    Id,
    Name,
    Description,
    Photo,
    Order,
    Color,
    CreatedAt,
    UpdatedAt,
}

/// Boxes (盲盒 + 累计财务数据)
#[derive(DeriveIden)]
enum Boxes {
    Table,
    Id,
    Title,
    Description,
    Location,
    Price,
    ImageUrl,
    BackgroundImage,
    IsActive,
    Order,
    BoxCategoryId,
    PurchasedCount,
    TotalRevenue,
    TotalPayout,
    ExchangeablePayout,
    RetainedProfitPercentage,
    CreatedAt,
    UpdatedAt,
}

/// Items (盒内奖品)
#[derive(DeriveIden)]
enum Items {
    Table,
    Id,
    BoxId,
    Name,
    Description,
    ImageUrl,
    Price,
    Percentage,
    Status,
    IsExchangeable,
    ViewCount,
    ClickCount,
    OpenedCount,
    PurchasedCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 金额统一使用 NUMERIC(18, 4)，累计字段默认 0，只能由抽奖以增量方式修改
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("item_status"))
                    .values(vec![
                        Alias::new("MOST_WANTED"),
                        Alias::new("WANTED"),
                        Alias::new("IN_DEMAND"),
                        Alias::new("UNCOMMON"),
                        Alias::new("COMMON"),
                    ])
                    .to_owned(),
            )
            .await?;

        // 分类表
        manager
            .create_table(
                Table::create()
                    .table(BoxCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BoxCategories::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BoxCategories::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(BoxCategories::Description).text().null())
                    .col(ColumnDef::new(BoxCategories::Photo).string_len(1024).null())
                    .col(
                        ColumnDef::new(BoxCategories::Order)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(BoxCategories::Color).string_len(64).null())
                    .col(
                        ColumnDef::new(BoxCategories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(BoxCategories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 盲盒表
        manager
            .create_table(
                Table::create()
                    .table(Boxes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Boxes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Boxes::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Boxes::Description).text().null())
                    .col(ColumnDef::new(Boxes::Location).string_len(255).not_null())
                    .col(ColumnDef::new(Boxes::Price).decimal_len(18, 4).not_null())
                    .col(ColumnDef::new(Boxes::ImageUrl).string_len(1024).not_null())
                    .col(
                        ColumnDef::new(Boxes::BackgroundImage)
                            .string_len(1024)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Boxes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Boxes::Order)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Boxes::BoxCategoryId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Boxes::PurchasedCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Boxes::TotalRevenue)
                            .decimal_len(18, 4)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Boxes::TotalPayout)
                            .decimal_len(18, 4)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Boxes::ExchangeablePayout)
                            .decimal_len(18, 4)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Boxes::RetainedProfitPercentage)
                            .decimal_len(7, 4)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Boxes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Boxes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_boxes_box_category")
                            .from(Boxes::Table, Boxes::BoxCategoryId)
                            .to(BoxCategories::Table, BoxCategories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_boxes_category")
                    .table(Boxes::Table)
                    .col(Boxes::BoxCategoryId)
                    .to_owned(),
            )
            .await?;

        // 奖品表（删除盲盒时级联删除奖品）
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Items::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Items::BoxId).big_integer().not_null())
                    .col(ColumnDef::new(Items::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Items::Description).text().null())
                    .col(ColumnDef::new(Items::ImageUrl).string_len(1024).null())
                    .col(
                        ColumnDef::new(Items::Price)
                            .decimal_len(18, 4)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Items::Percentage)
                            .double()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Items::Status)
                            .custom(Alias::new("item_status"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(Items::IsExchangeable).boolean().null())
                    .col(
                        ColumnDef::new(Items::ViewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Items::ClickCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Items::OpenedCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Items::PurchasedCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Items::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Items::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_items_box")
                            .from(Items::Table, Items::BoxId)
                            .to(Boxes::Table, Boxes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_items_box")
                    .table(Items::Table)
                    .col(Items::BoxId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：奖品 -> 盲盒 -> 分类 -> 枚举
        manager
            .drop_table(Table::drop().if_exists().table(Items::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Boxes::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(BoxCategories::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(Alias::new("item_status"))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
