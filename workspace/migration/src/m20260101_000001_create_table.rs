use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create members table
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(pk_auto(Members::Id))
                    .col(string(Members::FirstName))
                    .col(string(Members::LastName))
                    .col(string(Members::Email).unique_key())
                    .col(string_null(Members::Phone))
                    .col(string(Members::Role).string_len(20))
                    .col(boolean(Members::Active).default(true))
                    .to_owned(),
            )
            .await?;

        // Create accounts table
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(pk_auto(Accounts::Id))
                    .col(string(Accounts::Username).unique_key())
                    .col(string(Accounts::PasswordHash))
                    .col(string(Accounts::Email))
                    .col(string(Accounts::FirstName))
                    .col(string(Accounts::LastName))
                    .col(string(Accounts::Role).string_len(20))
                    .col(integer_null(Accounts::MemberId).unique_key())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_member")
                            .from(Accounts::Table, Accounts::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create membership_fees table
        manager
            .create_table(
                Table::create()
                    .table(MembershipFees::Table)
                    .if_not_exists()
                    .col(pk_auto(MembershipFees::Id))
                    .col(integer(MembershipFees::MemberId))
                    .col(integer(MembershipFees::Year))
                    .col(decimal(MembershipFees::Amount).decimal_len(8, 2))
                    .col(date_null(MembershipFees::PaymentDate))
                    .col(string(MembershipFees::Status).string_len(15))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_membership_fee_member")
                            .from(MembershipFees::Table, MembershipFees::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one fee per member per year
        manager
            .create_index(
                Index::create()
                    .name("unique_fee_per_member_year")
                    .table(MembershipFees::Table)
                    .col(MembershipFees::MemberId)
                    .col(MembershipFees::Year)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create events table
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(pk_auto(Events::Id))
                    .col(string(Events::Title))
                    .col(string_null(Events::Description))
                    .col(date_time(Events::Date))
                    .col(string(Events::Location))
                    .to_owned(),
            )
            .await?;

        // Create participations table
        manager
            .create_table(
                Table::create()
                    .table(Participations::Table)
                    .if_not_exists()
                    .col(pk_auto(Participations::Id))
                    .col(integer(Participations::MemberId))
                    .col(integer(Participations::EventId))
                    .col(boolean(Participations::Presence).default(false))
                    .col(date_time(Participations::RegisteredAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participation_member")
                            .from(Participations::Table, Participations::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participation_event")
                            .from(Participations::Table, Participations::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one registration per member per event
        manager
            .create_index(
                Index::create()
                    .name("unique_participation")
                    .table(Participations::Table)
                    .col(Participations::MemberId)
                    .col(Participations::EventId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create financial_transactions table
        manager
            .create_table(
                Table::create()
                    .table(FinancialTransactions::Table)
                    .if_not_exists()
                    .col(pk_auto(FinancialTransactions::Id))
                    .col(string(FinancialTransactions::TransactionType).string_len(10))
                    .col(decimal(FinancialTransactions::Amount).decimal_len(10, 2))
                    .col(date(FinancialTransactions::Date))
                    .col(string(FinancialTransactions::Description))
                    .col(integer_null(FinancialTransactions::EventId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_financial_transaction_event")
                            .from(FinancialTransactions::Table, FinancialTransactions::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(FinancialTransactions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Participations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(MembershipFees::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await?;

        Ok(())
    }
}

// Define identifiers for all tables

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    Role,
    Active,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Username,
    PasswordHash,
    Email,
    FirstName,
    LastName,
    Role,
    MemberId,
}

#[derive(DeriveIden)]
enum MembershipFees {
    Table,
    Id,
    MemberId,
    Year,
    Amount,
    PaymentDate,
    Status,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Title,
    Description,
    Date,
    Location,
}

#[derive(DeriveIden)]
enum Participations {
    Table,
    Id,
    MemberId,
    EventId,
    Presence,
    RegisteredAt,
}

#[derive(DeriveIden)]
enum FinancialTransactions {
    Table,
    Id,
    TransactionType,
    Amount,
    Date,
    Description,
    EventId,
}
