use std::collections::HashMap;

use sea_orm::{ConnectionTrait, DbErr, EntityTrait, QueryOrder};
use tracing::debug;

use super::parser::RawRecord;
use crate::entities::{actor, director, genre};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EntityKind {
    Director,
    Genre,
    Actor,
}

/// Dedup key for lookup entities: trimmed and case-folded.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NameKey(String);

impl NameKey {
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_lowercase()))
    }
}

/// A canonical lookup entity, either already persisted or staged by this import.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EntityRef {
    Stored(i32),
    /// Index into the staged names of the same kind.
    Staged(usize),
}

#[derive(Debug, Default)]
struct KindIndex {
    by_key: HashMap<NameKey, EntityRef>,
    staged: Vec<String>,
}

impl KindIndex {
    fn seeded(rows: impl IntoIterator<Item = (i32, String)>) -> Self {
        let mut index = Self::default();
        for (id, name) in rows {
            if let Some(key) = NameKey::new(&name) {
                // Rows arrive in id order, so the oldest of any stored duplicates wins.
                index.by_key.entry(key).or_insert(EntityRef::Stored(id));
            }
        }
        index
    }

    fn resolve(&mut self, raw: &str) -> Option<EntityRef> {
        let key = NameKey::new(raw)?;
        let staged = &mut self.staged;
        let entity = *self.by_key.entry(key).or_insert_with(|| {
            staged.push(raw.trim().to_string());
            EntityRef::Staged(staged.len() - 1)
        });
        Some(entity)
    }
}

/// Lookup entities that must be inserted before the movies referencing them.
#[derive(Debug, Default, PartialEq)]
pub struct StagedEntities {
    pub directors: Vec<String>,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
}

impl StagedEntities {
    pub fn names(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Director => &self.directors,
            EntityKind::Genre => &self.genres,
            EntityKind::Actor => &self.actors,
        }
    }

    pub fn len(&self) -> usize {
        self.directors.len() + self.genres.len() + self.actors.len()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRecord {
    pub record: RawRecord,
    pub director: Option<EntityRef>,
    pub genre: Option<EntityRef>,
    pub actors: Vec<EntityRef>,
}

/// Maps free-text names to canonical entities for the lifetime of one import.
///
/// The per-kind maps are seeded once from the store and then grow as rows stage
/// new names, so equal names across the store and the batch share one entity.
#[derive(Debug, Default)]
pub struct EntityResolver {
    directors: KindIndex,
    genres: KindIndex,
    actors: KindIndex,
}

impl EntityResolver {
    /// Seeds the maps with one bulk read per entity kind.
    pub async fn load<C: ConnectionTrait>(db: &C) -> Result<Self, DbErr> {
        let directors = director::Entity::find()
            .order_by_asc(director::Column::Id)
            .all(db)
            .await?;
        let genres = genre::Entity::find().order_by_asc(genre::Column::Id).all(db).await?;
        let actors = actor::Entity::find().order_by_asc(actor::Column::Id).all(db).await?;

        debug!(
            directors = directors.len(),
            genres = genres.len(),
            actors = actors.len(),
            "loaded existing lookup entities"
        );

        Ok(Self {
            directors: KindIndex::seeded(directors.into_iter().map(|m| (m.id, m.name))),
            genres: KindIndex::seeded(genres.into_iter().map(|m| (m.id, m.name))),
            actors: KindIndex::seeded(actors.into_iter().map(|m| (m.id, m.name))),
        })
    }

    fn index_mut(&mut self, kind: EntityKind) -> &mut KindIndex {
        match kind {
            EntityKind::Director => &mut self.directors,
            EntityKind::Genre => &mut self.genres,
            EntityKind::Actor => &mut self.actors,
        }
    }

    /// Returns the canonical entity for `raw`, staging a new one on first sight.
    /// Blank or missing names resolve to nothing.
    pub fn resolve(&mut self, kind: EntityKind, raw: Option<&str>) -> Option<EntityRef> {
        self.index_mut(kind).resolve(raw?)
    }

    /// Resolves a comma-separated list. Names that normalize equal collapse to one entry.
    pub fn resolve_list(&mut self, kind: EntityKind, raw: Option<&str>) -> Vec<EntityRef> {
        let mut out = Vec::new();
        for name in raw.unwrap_or_default().split(',') {
            if let Some(entity) = self.resolve(kind, Some(name)) {
                if !out.contains(&entity) {
                    out.push(entity);
                }
            }
        }
        out
    }

    pub fn resolve_record(&mut self, record: RawRecord) -> ResolvedRecord {
        let director = self.resolve(EntityKind::Director, record.director.as_deref());
        let genre = self.resolve(EntityKind::Genre, record.genre.as_deref());
        let actors = self.resolve_list(EntityKind::Actor, record.actors.as_deref());
        ResolvedRecord { record, director, genre, actors }
    }

    pub fn into_staged(self) -> StagedEntities {
        StagedEntities {
            directors: self.directors.staged,
            genres: self.genres.staged,
            actors: self.actors.staged,
        }
    }
}
