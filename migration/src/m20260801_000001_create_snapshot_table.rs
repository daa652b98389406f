use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Snapshot::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Snapshot::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Snapshot::Symbol).string().null())
                    .col(ColumnDef::new(Snapshot::CurrentPrice).double().null())
                    .col(ColumnDef::new(Snapshot::MarketCap).double().null())
                    .col(ColumnDef::new(Snapshot::TotalVolume).double().null())
                    .col(ColumnDef::new(Snapshot::PriceChange24h).double().null())
                    .col(ColumnDef::new(Snapshot::PriceChangePct24h).double().null())
                    .col(ColumnDef::new(Snapshot::Image).string().null())
                    .col(ColumnDef::new(Snapshot::LastUpdated).string().null())
                    .col(ColumnDef::new(Snapshot::RecordedAt).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Snapshot::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Snapshot {
    Table,
    Name,
    Symbol,
    CurrentPrice,
    MarketCap,
    TotalVolume,
    #[sea_orm(iden = "price_change_24h")]
    PriceChange24h,
    #[sea_orm(iden = "price_change_pct_24h")]
    PriceChangePct24h,
    Image,
    LastUpdated,
    RecordedAt,
}
