use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Directors::Table)
                    .if_not_exists()
                    .col(pk_auto(Directors::Id))
                    .col(string(Directors::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genres::Table)
                    .if_not_exists()
                    .col(pk_auto(Genres::Id))
                    .col(string(Genres::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Actors::Table)
                    .if_not_exists()
                    .col(pk_auto(Actors::Id))
                    .col(string(Actors::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(string(Movies::Name))
                    .col(text_null(Movies::Description))
                    .col(integer_null(Movies::DirectorId))
                    .col(integer_null(Movies::GenreId))
                    .col(integer_null(Movies::Year))
                    .col(integer_null(Movies::Runtime))
                    .col(double_null(Movies::Rating))
                    .col(integer(Movies::Votes))
                    .col(double_null(Movies::Revenue))
                    .col(integer_null(Movies::Metascore))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_director")
                            .from(Movies::Table, Movies::DirectorId)
                            .to(Directors::Table, Directors::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_genre")
                            .from(Movies::Table, Movies::GenreId)
                            .to(Genres::Table, Genres::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MoviesActors::Table)
                    .if_not_exists()
                    .col(integer(MoviesActors::MovieId))
                    .col(integer(MoviesActors::ActorId))
                    .primary_key(
                        Index::create().col(MoviesActors::MovieId).col(MoviesActors::ActorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_actors_movie")
                            .from(MoviesActors::Table, MoviesActors::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_actors_actor")
                            .from(MoviesActors::Table, MoviesActors::ActorId)
                            .to(Actors::Table, Actors::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MoviesActors::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Actors::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genres::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Directors::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Directors {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Genres {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Actors {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Name,
    Description,
    DirectorId,
    GenreId,
    Year,
    Runtime,
    Rating,
    Votes,
    Revenue,
    Metascore,
}

#[derive(DeriveIden)]
enum MoviesActors {
    Table,
    MovieId,
    ActorId,
}
