use sea_orm_migration::{prelude::*, schema::*, sea_query::extension::postgres::Type};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(UserRole::Table)
                    .values(vec![UserRole::Volunteer, UserRole::Captain, UserRole::Admin])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string(Users::Email).not_null())
                    .col(string(Users::DisplayName).not_null())
                    .col(
                        enumeration(
                            Users::Role,
                            UserRole::Table,
                            vec![UserRole::Volunteer, UserRole::Captain, UserRole::Admin],
                        )
                        .default("volunteer"),
                    )
                    .col(boolean(Users::IsActive).not_null().default(true))
                    .col(string_null(Users::AvatarUrl))
                    .col(string_null(Users::PostalCode))
                    .col(string_null(Users::Street))
                    .col(string_null(Users::City))
                    .col(string_null(Users::Region))
                    .col(
                        timestamp_with_time_zone(Users::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Users::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(Users::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email_unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(UserRole::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Email,
    DisplayName,
    Role,
    IsActive,
    AvatarUrl,
    PostalCode,
    Street,
    City,
    Region,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
pub enum UserRole {
    Table,
    Volunteer,
    Captain,
    Admin,
}
