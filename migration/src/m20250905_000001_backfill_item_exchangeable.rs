use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 历史数据迁移：按旧命名规则回填 items.is_exchangeable
///
/// 旧规则：名称按空白拆分后第二段的前导整数 <= 17 视为可兑换，
/// 无法解析的视为不可兑换。回填后新数据应直接设置该字段。
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        let backfill_sql = r#"
UPDATE items
SET is_exchangeable = COALESCE(
    (substring(split_part(regexp_replace(btrim(name), '\s+', ' ', 'g'), ' ', 2) FROM '^[+-]?[0-9]+'))::numeric <= 17,
    FALSE
)
WHERE is_exchangeable IS NULL;
"#;
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            backfill_sql.to_string(),
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 无法区分人工设置与回填值，统一清空
        let conn = manager.get_connection();
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            "UPDATE items SET is_exchangeable = NULL;".to_string(),
        ))
        .await?;
        Ok(())
    }
}
