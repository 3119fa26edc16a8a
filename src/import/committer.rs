use sea_orm::{
    ActiveValue::Set, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, TransactionTrait,
};
use tracing::{debug, info};

use super::{
    assembler::Batch,
    resolver::{EntityKind, EntityRef, StagedEntities},
};
use crate::entities::{actor, director, genre, movie, movie_actor};

// Two bound parameters per link; keeps each statement well under SQLite's variable cap.
const LINK_CHUNK: usize = 1000;

/// Store identities generated for staged entities, per kind, in staging order.
#[derive(Debug, Default)]
struct Identities {
    directors: Vec<i32>,
    genres: Vec<i32>,
    actors: Vec<i32>,
}

impl Identities {
    fn of_kind(&self, kind: EntityKind) -> &[i32] {
        match kind {
            EntityKind::Director => &self.directors,
            EntityKind::Genre => &self.genres,
            EntityKind::Actor => &self.actors,
        }
    }

    fn of_kind_mut(&mut self, kind: EntityKind) -> &mut Vec<i32> {
        match kind {
            EntityKind::Director => &mut self.directors,
            EntityKind::Genre => &mut self.genres,
            EntityKind::Actor => &mut self.actors,
        }
    }

    fn id(&self, kind: EntityKind, entity: EntityRef) -> Result<i32, DbErr> {
        match entity {
            EntityRef::Stored(id) => Ok(id),
            EntityRef::Staged(idx) => self.of_kind(kind).get(idx).copied().ok_or_else(|| {
                DbErr::Custom(format!("{kind:?} staged at {idx} was never inserted"))
            }),
        }
    }

    fn opt_id(&self, kind: EntityKind, entity: Option<EntityRef>) -> Result<Option<i32>, DbErr> {
        entity.map(|e| self.id(kind, e)).transpose()
    }
}

async fn insert_lookup(
    txn: &DatabaseTransaction,
    kind: EntityKind,
    name: &str,
) -> Result<i32, DbErr> {
    let name = Set(name.to_string());
    let id = match kind {
        EntityKind::Director => {
            director::Entity::insert(director::ActiveModel { name, ..Default::default() })
                .exec(txn)
                .await?
                .last_insert_id
        },
        EntityKind::Genre => {
            genre::Entity::insert(genre::ActiveModel { name, ..Default::default() })
                .exec(txn)
                .await?
                .last_insert_id
        },
        EntityKind::Actor => {
            actor::Entity::insert(actor::ActiveModel { name, ..Default::default() })
                .exec(txn)
                .await?
                .last_insert_id
        },
    };
    Ok(id)
}

/// Writes staged lookup entities, then movies and their actor links, in one transaction.
///
/// Returns the number of movies inserted. On any error the transaction is dropped
/// uncommitted, which rolls back every row written so far.
pub async fn commit(
    db: &DatabaseConnection,
    staged: &StagedEntities,
    batch: &Batch,
) -> Result<u64, DbErr> {
    let txn = db.begin().await?;

    let mut ids = Identities::default();
    for kind in [EntityKind::Director, EntityKind::Genre, EntityKind::Actor] {
        for name in staged.names(kind) {
            let id = insert_lookup(&txn, kind, name).await?;
            ids.of_kind_mut(kind).push(id);
        }
    }
    debug!(new_entities = staged.len(), "inserted lookup entities");

    let mut movie_ids = Vec::with_capacity(batch.movies.len());
    for new in &batch.movies {
        let model = movie::ActiveModel {
            name: Set(new.name.clone()),
            description: Set(new.description.clone()),
            director_id: Set(ids.opt_id(EntityKind::Director, new.director)?),
            genre_id: Set(ids.opt_id(EntityKind::Genre, new.genre)?),
            year: Set(new.year),
            runtime: Set(new.runtime),
            rating: Set(new.rating),
            votes: Set(new.votes),
            revenue: Set(new.revenue),
            metascore: Set(new.metascore),
            ..Default::default()
        };
        movie_ids.push(movie::Entity::insert(model).exec(&txn).await?.last_insert_id);
    }

    let mut links = Vec::with_capacity(batch.links.len());
    for link in &batch.links {
        let movie_id = *movie_ids
            .get(link.movie)
            .ok_or_else(|| DbErr::Custom(format!("link to unknown movie {}", link.movie)))?;
        links.push(movie_actor::ActiveModel {
            movie_id: Set(movie_id),
            actor_id: Set(ids.id(EntityKind::Actor, link.actor)?),
        });
    }
    for chunk in links.chunks(LINK_CHUNK) {
        movie_actor::Entity::insert_many(chunk.iter().cloned())
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;

    info!(
        movies = movie_ids.len(),
        links = batch.links.len(),
        new_entities = staged.len(),
        "committed import"
    );
    Ok(movie_ids.len() as u64)
}

#[cfg(test)]
mod tests {
    use sea_orm::PaginatorTrait;

    use super::*;
    use crate::{
        db,
        import::assembler::{MovieLink, NewMovie},
    };

    fn new_movie(name: &str, director: Option<EntityRef>) -> NewMovie {
        NewMovie {
            name: name.to_string(),
            description: None,
            director,
            genre: None,
            year: None,
            runtime: None,
            rating: None,
            votes: 0,
            revenue: None,
            metascore: None,
        }
    }

    async fn counts(db: &DatabaseConnection) -> [u64; 5] {
        [
            director::Entity::find().count(db).await.unwrap(),
            genre::Entity::find().count(db).await.unwrap(),
            actor::Entity::find().count(db).await.unwrap(),
            movie::Entity::find().count(db).await.unwrap(),
            movie_actor::Entity::find().count(db).await.unwrap(),
        ]
    }

    #[tokio::test]
    async fn inserts_lookups_before_movies() {
        let db = db::memory().await;
        let staged = StagedEntities {
            directors: vec!["Jane Doe".into()],
            genres: vec!["Drama".into()],
            actors: vec!["A".into(), "B".into()],
        };
        let mut first = new_movie("Alpha", Some(EntityRef::Staged(0)));
        first.genre = Some(EntityRef::Staged(0));
        let batch = Batch {
            movies: vec![first, new_movie("Beta", None)],
            links: vec![
                MovieLink { movie: 0, actor: EntityRef::Staged(0) },
                MovieLink { movie: 0, actor: EntityRef::Staged(1) },
                MovieLink { movie: 1, actor: EntityRef::Staged(1) },
            ],
        };

        assert_eq!(commit(&db, &staged, &batch).await.unwrap(), 2);
        assert_eq!(counts(&db).await, [1, 1, 2, 2, 3]);

        let movies = movie::Entity::find().all(&db).await.unwrap();
        let jane = director::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(movies[0].director_id, Some(jane.id));
        assert_eq!(movies[1].director_id, None);
        assert_eq!(movies[1].genre_id, None);
    }

    #[tokio::test]
    async fn failed_movie_insert_rolls_back_everything() {
        let db = db::memory().await;
        let staged = StagedEntities {
            directors: vec!["Jane Doe".into()],
            genres: Vec::new(),
            actors: vec!["A".into()],
        };
        // The second movie points at a director that does not exist.
        let batch = Batch {
            movies: vec![
                new_movie("Alpha", Some(EntityRef::Staged(0))),
                new_movie("Beta", Some(EntityRef::Stored(9_999))),
            ],
            links: vec![MovieLink { movie: 0, actor: EntityRef::Staged(0) }],
        };

        assert!(commit(&db, &staged, &batch).await.is_err());
        assert_eq!(counts(&db).await, [0, 0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn failed_link_insert_rolls_back_everything() {
        let db = db::memory().await;
        let staged = StagedEntities { actors: vec!["A".into()], ..Default::default() };
        let batch = Batch {
            movies: vec![new_movie("Alpha", None)],
            links: vec![MovieLink { movie: 0, actor: EntityRef::Stored(42) }],
        };

        assert!(commit(&db, &staged, &batch).await.is_err());
        assert_eq!(counts(&db).await, [0, 0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn links_beyond_one_statement_are_written_in_chunks() {
        let db = db::memory().await;
        let actors: Vec<String> = (0..60).map(|i| format!("Actor {i}")).collect();
        let movies: Vec<NewMovie> = (0..400).map(|i| new_movie(&format!("M{i}"), None)).collect();
        let links = (0..movies.len())
            .flat_map(|movie| (0..actors.len()).map(move |a| (movie, a)))
            .map(|(movie, a)| MovieLink { movie, actor: EntityRef::Staged(a) })
            .collect::<Vec<_>>();
        assert!(links.len() > 20 * LINK_CHUNK);

        let staged = StagedEntities { actors, ..Default::default() };
        let batch = Batch { movies, links };
        assert_eq!(commit(&db, &staged, &batch).await.unwrap(), 400);
        assert_eq!(counts(&db).await, [0, 0, 60, 400, 24_000]);
    }

    #[tokio::test]
    async fn unknown_staged_reference_is_an_error() {
        let db = db::memory().await;
        let batch = Batch {
            movies: vec![new_movie("Alpha", Some(EntityRef::Staged(3)))],
            links: Vec::new(),
        };

        let err = commit(&db, &StagedEntities::default(), &batch).await.unwrap_err();
        assert!(matches!(err, DbErr::Custom(_)));
        assert_eq!(counts(&db).await, [0, 0, 0, 0, 0]);
    }
}
