use super::resolver::{EntityRef, ResolvedRecord};

/// A movie ready for insertion; lookup references may still point at staged entities.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMovie {
    pub name: String,
    pub description: Option<String>,
    pub director: Option<EntityRef>,
    pub genre: Option<EntityRef>,
    pub year: Option<i32>,
    pub runtime: Option<i32>,
    pub rating: Option<f64>,
    pub votes: i32,
    pub revenue: Option<f64>,
    pub metascore: Option<i32>,
}

/// Join row keyed by the movie's position in [`Batch::movies`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MovieLink {
    pub movie: usize,
    pub actor: EntityRef,
}

#[derive(Debug, Default, PartialEq)]
pub struct Batch {
    pub movies: Vec<NewMovie>,
    pub links: Vec<MovieLink>,
}

pub fn assemble(records: Vec<ResolvedRecord>) -> Batch {
    let mut batch = Batch { movies: Vec::with_capacity(records.len()), links: Vec::new() };

    for ResolvedRecord { record, director, genre, actors } in records {
        let movie = batch.movies.len();
        batch.links.extend(actors.into_iter().map(|actor| MovieLink { movie, actor }));
        batch.movies.push(NewMovie {
            name: record.name.as_deref().unwrap_or_default().trim().to_string(),
            description: record.description,
            director,
            genre,
            year: record.year,
            runtime: record.runtime,
            rating: record.rating,
            votes: record.votes,
            revenue: record.revenue,
            metascore: record.metascore,
        });
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::parser::RawRecord;

    fn resolved(name: &str, actors: Vec<EntityRef>) -> ResolvedRecord {
        ResolvedRecord {
            record: RawRecord {
                name: Some(name.to_string()),
                votes: 1,
                year: None,
                revenue: Some(12.5),
                ..Default::default()
            },
            director: Some(EntityRef::Stored(7)),
            genre: None,
            actors,
        }
    }

    #[test]
    fn keeps_record_order_and_links_by_position() {
        let batch = assemble(vec![
            resolved(" Alpha ", vec![EntityRef::Staged(0), EntityRef::Staged(1)]),
            resolved("Beta", vec![EntityRef::Staged(1), EntityRef::Stored(3)]),
        ]);

        let names: Vec<&str> = batch.movies.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Beta"]);
        assert_eq!(
            batch.links,
            vec![
                MovieLink { movie: 0, actor: EntityRef::Staged(0) },
                MovieLink { movie: 0, actor: EntityRef::Staged(1) },
                MovieLink { movie: 1, actor: EntityRef::Staged(1) },
                MovieLink { movie: 1, actor: EntityRef::Stored(3) },
            ]
        );
    }

    #[test]
    fn carries_nullable_fields_unchanged() {
        let batch = assemble(vec![resolved("Alpha", vec![])]);
        let movie = &batch.movies[0];
        assert_eq!(movie.year, None);
        assert_eq!(movie.revenue, Some(12.5));
        assert_eq!(movie.metascore, None);
        assert_eq!(movie.director, Some(EntityRef::Stored(7)));
        assert_eq!(movie.genre, None);
        assert!(batch.links.is_empty());
    }

    #[test]
    fn empty_input_gives_empty_batch() {
        assert_eq!(assemble(Vec::new()), Batch::default());
    }
}
