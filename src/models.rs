use std::collections::BTreeMap;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// The relationship a partner holds on a movie.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Publisher,
    Director,
    Producer,
    Cast,
    Writer,
    Editor,
    Music,
    Story,
    Screenplay,
    Distributor,
}

impl Role {
    pub const ALL: [Role; 10] = [
        Role::Publisher,
        Role::Director,
        Role::Producer,
        Role::Cast,
        Role::Writer,
        Role::Editor,
        Role::Music,
        Role::Story,
        Role::Screenplay,
        Role::Distributor,
    ];

    pub fn as_code(self) -> &'static str {
        match self {
            Role::Publisher => "publisher",
            Role::Director => "director",
            Role::Producer => "producer",
            Role::Cast => "cast",
            Role::Writer => "writer",
            Role::Editor => "editor",
            Role::Music => "music",
            Role::Story => "story",
            Role::Screenplay => "screenplay",
            Role::Distributor => "distributor",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Role::ALL.into_iter().find(|r| r.as_code() == code)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum Rating {
    #[default]
    NoRating,
    VeryLow,
    Low,
    Good,
    VeryGood,
    Excellent,
}

impl Rating {
    pub fn as_code(self) -> i32 {
        match self {
            Rating::NoRating => 0,
            Rating::VeryLow => 1,
            Rating::Low => 2,
            Rating::Good => 3,
            Rating::VeryGood => 4,
            Rating::Excellent => 5,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Rating::NoRating),
            1 => Some(Rating::VeryLow),
            2 => Some(Rating::Low),
            3 => Some(Rating::Good),
            4 => Some(Rating::VeryGood),
            5 => Some(Rating::Excellent),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::NoRating => "No rating",
            Rating::VeryLow => "Very low",
            Rating::Low => "Low",
            Rating::Good => "Good",
            Rating::VeryGood => "Very good",
            Rating::Excellent => "Excellent",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncCategory {
    TrendingMovies,
}

impl SyncCategory {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "trending_movies" => Some(SyncCategory::TrendingMovies),
            _ => None,
        }
    }
}

/// Everything needed to insert a movie discovered in a catalog list.
#[derive(Clone, Debug)]
pub struct NewMovie {
    pub external_id: i64,
    pub title: String,
    pub storyline: Option<String>,
    pub release_date: Option<Date>,
    pub language_id: Option<i32>,
    pub poster: Option<String>,
    pub stage_id: Option<i32>,
}

/// Scalar fields written by the detail step.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieDetails {
    pub runtime: Option<f64>,
    pub adult: bool,
    pub homepage: Option<String>,
    pub box_office: f64,
    pub rating: Rating,
}

#[derive(Clone, Debug, Serialize)]
pub struct CreatedMovie {
    pub external_id: i64,
    pub title: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SyncReport {
    pub fetched: usize,
    pub created: Vec<CreatedMovie>,
    pub skipped: Vec<String>,
}

/// How many link instructions of each kind a step applied.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct LinkReport {
    pub linked: usize,
    pub created: usize,
    pub skipped: usize,
}

impl LinkReport {
    pub fn merge(&mut self, other: LinkReport) {
        self.linked += other.linked;
        self.created += other.created;
        self.skipped += other.skipped;
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct MovieListItem {
    pub external_id: i64,
    pub title: String,
    pub release_date: Option<String>,
    pub stage: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MovieView {
    pub external_id: i64,
    pub title: String,
    pub storyline: Option<String>,
    pub release_date: Option<String>,
    pub has_poster: bool,
    pub runtime: Option<f64>,
    pub rating: &'static str,
    pub box_office: Option<f64>,
    pub adult: bool,
    pub homepage: Option<String>,
    pub language: Option<String>,
    pub stage: Option<String>,
    pub genres: Vec<String>,
    pub credits: BTreeMap<Role, Vec<CreditView>>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CreditView {
    pub partner_id: i32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct StageRequest {
    pub stage: String,
}

#[derive(Debug, Deserialize)]
pub struct LinkCreditRequest {
    pub role: String,
    pub name: String,
}
