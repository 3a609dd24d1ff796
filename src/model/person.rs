//! Person records as the tree sees them.
//!
//! Raw rows arrive as [`PersonRecord`] with the usual loose shape (either a
//! `full_name` or a `given_name`/`surname` pair, birth/death as a year or an
//! ISO date). [`Person::from_record`] resolves all of that once, so render
//! sites only ever read `display_name` and the extracted years.

use serde::{Deserialize, Serialize};

/// Opaque person identifier, as issued by the row store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub String);

impl PersonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PersonId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Gender, used only to choose a placeholder avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[serde(other)]
    Unspecified,
}

/// A birth/death value as stored: either a bare year or a date string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearOrDate {
    Year(i32),
    Date(String),
}

impl YearOrDate {
    /// Extract the year. Dates are read as `YYYY[-MM[-DD]]`.
    pub fn year(&self) -> Option<i32> {
        match self {
            YearOrDate::Year(y) => Some(*y),
            YearOrDate::Date(s) => {
                let digits: String = s
                    .trim()
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                if digits.is_empty() { None } else { digits.parse().ok() }
            }
        }
    }
}

/// Person row as delivered by the data layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub birth_date: Option<YearOrDate>,
    #[serde(default)]
    pub death_date: Option<YearOrDate>,
    #[serde(default)]
    pub is_living: Option<bool>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

/// Canonical person, resolved once at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub display_name: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    pub is_deceased: bool,
    pub avatar_url: Option<String>,
    pub gender: Gender,
}

impl Person {
    /// Minimal person with just an id and a name.
    pub fn new(id: impl Into<PersonId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            birth_year: None,
            death_year: None,
            is_deceased: false,
            avatar_url: None,
            gender: Gender::Unspecified,
        }
    }

    pub fn with_years(mut self, birth: Option<i32>, death: Option<i32>) -> Self {
        self.birth_year = birth;
        self.death_year = death;
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn deceased(mut self) -> Self {
        self.is_deceased = true;
        self
    }

    /// Resolve a raw record: `full_name`, else `given_name surname`, else
    /// "Unknown".
    pub fn from_record(record: PersonRecord) -> Self {
        let full = record
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let display_name = full.unwrap_or_else(|| {
            let parts: Vec<&str> = [record.given_name.as_deref(), record.surname.as_deref()]
                .into_iter()
                .flatten()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if parts.is_empty() { "Unknown".to_string() } else { parts.join(" ") }
        });

        let death_year = record.death_date.as_ref().and_then(YearOrDate::year);
        let is_deceased = record.is_living == Some(false) || record.death_date.is_some();

        Self {
            id: PersonId(record.id),
            display_name,
            birth_year: record.birth_date.as_ref().and_then(YearOrDate::year),
            death_year,
            is_deceased,
            avatar_url: record.avatar_url.filter(|u| !u.is_empty()),
            gender: record.gender.unwrap_or(Gender::Unspecified),
        }
    }

    /// `"1950–Living"`, `"1950–2010"`, `"?–2010"`, `"1950–?"`.
    pub fn life_span(&self) -> String {
        let birth = self.birth_year.map_or_else(|| "?".to_string(), |y| y.to_string());
        if self.death_year.is_none() && !self.is_deceased {
            return format!("{birth}–Living");
        }
        let death = self.death_year.map_or_else(|| "?".to_string(), |y| y.to_string());
        format!("{birth}–{death}")
    }
}
