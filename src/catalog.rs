use std::collections::HashMap;

use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use tracing::debug;

use crate::{
    entities::{actor, director, genre, movie, movie_actor},
    error::AppResult,
    models::MovieView,
};

/// Read side of the catalog: listing, searching and clearing movies.
#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
}

struct CatalogRow {
    view: MovieView,
    actor_names: Vec<String>,
}

impl CatalogRow {
    fn matches(&self, query: &str) -> bool {
        let contains = |s: &str| s.to_lowercase().contains(query);
        contains(self.view.name.as_str())
            || self.view.director_name.as_deref().is_some_and(contains)
            || self.actor_names.iter().any(|a| contains(a.as_str()))
            || self.view.year.is_some_and(|y| y.to_string() == query)
    }
}

impl Catalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_movies(&self) -> AppResult<Vec<MovieView>> {
        Ok(self.rows().await?.into_iter().map(|r| r.view).collect())
    }

    /// Case-insensitive match on movie, director or actor name, or exact year.
    pub async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieView>> {
        let query = query.trim().to_lowercase();
        let rows = self.rows().await?;
        let total = rows.len();
        let hits: Vec<MovieView> =
            rows.into_iter().filter(|r| r.matches(&query)).map(|r| r.view).collect();
        debug!(query = %query, total, hits = hits.len(), "searched catalog");
        Ok(hits)
    }

    /// Deletes every movie. Actor links cascade; directors, genres and actors stay.
    pub async fn delete_all_movies(&self) -> AppResult<u64> {
        let res = movie::Entity::delete_many().exec(&self.db).await?;
        debug!(deleted = res.rows_affected, "deleted all movies");
        Ok(res.rows_affected)
    }

    async fn rows(&self) -> AppResult<Vec<CatalogRow>> {
        let movies = movie::Entity::find().order_by_asc(movie::Column::Id).all(&self.db).await?;
        let directors: HashMap<i32, String> = director::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();
        let genres: HashMap<i32, String> = genre::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|g| (g.id, g.name))
            .collect();
        let actors: HashMap<i32, String> = actor::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a.name))
            .collect();

        let mut cast: HashMap<i32, Vec<String>> = HashMap::new();
        let links = movie_actor::Entity::find()
            .order_by_asc(movie_actor::Column::MovieId)
            .order_by_asc(movie_actor::Column::ActorId)
            .all(&self.db)
            .await?;
        for link in links {
            if let Some(name) = actors.get(&link.actor_id) {
                cast.entry(link.movie_id).or_default().push(name.clone());
            }
        }

        let rows = movies
            .into_iter()
            .map(|m| {
                let actor_names = cast.remove(&m.id).unwrap_or_default();
                let view = MovieView {
                    genre_name: m.genre_id.and_then(|id| genres.get(&id).cloned()),
                    director_name: m.director_id.and_then(|id| directors.get(&id).cloned()),
                    actors: actor_names.join(", "),
                    name: m.name,
                    description: m.description,
                    year: m.year,
                    runtime: m.runtime,
                    rating: m.rating,
                    votes: m.votes,
                    revenue: m.revenue,
                    metascore: m.metascore,
                };
                CatalogRow { view, actor_names }
            })
            .collect();

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sea_orm::PaginatorTrait;

    use super::*;
    use crate::{db, import::Importer};

    const CATALOG: &str = "\
Name,Genre,Description,Director,Actors,Year,Runtime (Minutes),Rating,Votes,Revenue (Millions),Metascore
Guardians of the Galaxy,Action,Space heroes,James Gunn,\"Chris Pratt, Zoe Saldana\",2014,121,8.1,757074,333.13,76
Prometheus,Adventure,Origins,Ridley Scott,\"Noomi Rapace, Michael Fassbender\",2012,124,7,485820,126.46,65
Untitled,,,,,,,,0,,
";

    async fn seeded() -> Catalog {
        let db = db::memory().await;
        Importer::new(db.clone(), Duration::from_secs(5)).import_csv(CATALOG).await.unwrap();
        Catalog::new(db)
    }

    #[tokio::test]
    async fn lists_movies_with_joined_names() {
        let catalog = seeded().await;
        let movies = catalog.list_movies().await.unwrap();
        assert_eq!(movies.len(), 3);

        let guardians = &movies[0];
        assert_eq!(guardians.name, "Guardians of the Galaxy");
        assert_eq!(guardians.director_name.as_deref(), Some("James Gunn"));
        assert_eq!(guardians.genre_name.as_deref(), Some("Action"));
        assert_eq!(guardians.actors, "Chris Pratt, Zoe Saldana");
        assert_eq!(guardians.revenue, Some(333.13));

        let untitled = &movies[2];
        assert_eq!(untitled.director_name, None);
        assert_eq!(untitled.genre_name, None);
        assert_eq!(untitled.actors, "");
    }

    #[tokio::test]
    async fn searches_names_directors_actors_and_year() {
        let catalog = seeded().await;
        let names =
            |movies: Vec<MovieView>| movies.into_iter().map(|m| m.name).collect::<Vec<_>>();

        let galaxy = catalog.search_movies("galaxy").await.unwrap();
        assert_eq!(names(galaxy), ["Guardians of the Galaxy"]);
        assert_eq!(names(catalog.search_movies(" RIDLEY ").await.unwrap()), ["Prometheus"]);
        assert_eq!(names(catalog.search_movies("fassbender").await.unwrap()), ["Prometheus"]);
        let by_year = catalog.search_movies("2014").await.unwrap();
        assert_eq!(names(by_year), ["Guardians of the Galaxy"]);
        assert!(catalog.search_movies("201").await.unwrap().is_empty());
        assert_eq!(catalog.search_movies("").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn delete_all_cascades_links_and_keeps_lookups() {
        let catalog = seeded().await;
        assert_eq!(catalog.delete_all_movies().await.unwrap(), 3);

        assert!(catalog.list_movies().await.unwrap().is_empty());
        assert_eq!(movie_actor::Entity::find().count(&catalog.db).await.unwrap(), 0);
        assert_eq!(actor::Entity::find().count(&catalog.db).await.unwrap(), 4);
        assert_eq!(director::Entity::find().count(&catalog.db).await.unwrap(), 2);
    }
}
