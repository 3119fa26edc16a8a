use serde::{Deserialize, Serialize};

/// A movie as presented to catalog readers, with lookup names joined in.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieView {
    pub name: String,
    pub genre_name: Option<String>,
    pub description: Option<String>,
    pub director_name: Option<String>,
    pub actors: String,
    pub year: Option<i32>,
    pub runtime: Option<i32>,
    pub rating: Option<f64>,
    pub votes: i32,
    pub revenue: Option<f64>,
    pub metascore: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}
