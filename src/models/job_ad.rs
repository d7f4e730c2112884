// src/models/job_ad.rs

//! Job ad record shared by parsers, storage and export.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

/// Columns of a job ad record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Site,
    SearchTerm,
    Id,
    Title,
    Url,
    Description,
    Date,
    Language,
    Relevant,
    Recommendation,
}

impl Field {
    /// All columns in storage order.
    pub const ALL: [Field; 10] = [
        Field::Site,
        Field::SearchTerm,
        Field::Id,
        Field::Title,
        Field::Url,
        Field::Description,
        Field::Date,
        Field::Language,
        Field::Relevant,
        Field::Recommendation,
    ];

    /// Columns a parser must fill before an ad is emitted.
    pub const PARSED: [Field; 4] = [Field::Id, Field::Title, Field::Url, Field::Description];

    /// Columns required before an ad can be stored.
    pub const STORABLE: [Field; 6] = [
        Field::Site,
        Field::SearchTerm,
        Field::Id,
        Field::Title,
        Field::Url,
        Field::Description,
    ];

    /// Column name as used in mappings and storage.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Site => "site",
            Field::SearchTerm => "searchterm",
            Field::Id => "id",
            Field::Title => "title",
            Field::Url => "url",
            Field::Description => "description",
            Field::Date => "date",
            Field::Language => "language",
            Field::Relevant => "relevant",
            Field::Recommendation => "recommendation",
        }
    }
}

impl FromStr for Field {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| AppError::unknown_field(s))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Language of an ad, set by the classification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    Finnish,
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "english" => Ok(Language::English),
            "finnish" => Ok(Language::Finnish),
            other => Err(AppError::validation(format!(
                "Unknown language '{other}' (expected English or Finnish)"
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => f.write_str("English"),
            Language::Finnish => f.write_str("Finnish"),
        }
    }
}

/// A job advertisement.
///
/// The record is closed over the ten columns in [`Field`]; string-keyed access
/// goes through [`JobAd::get`], [`JobAd::set`] and [`JobAd::delete`], which
/// reject any other key with [`AppError::UnknownField`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAd {
    /// Name of the source site
    #[serde(default)]
    pub site: Option<String>,

    /// Search term that found the ad
    #[serde(default)]
    pub searchterm: Option<String>,

    /// Site-provided identifier
    #[serde(default)]
    pub id: Option<String>,

    /// Job title
    #[serde(default)]
    pub title: Option<String>,

    /// Absolute URL to the ad
    #[serde(default)]
    pub url: Option<String>,

    /// Snippet or body text
    #[serde(default)]
    pub description: Option<String>,

    /// Date the ad was first stored
    #[serde(default)]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub language: Option<Language>,

    /// Manual relevance tag (0 or 1)
    #[serde(default)]
    pub relevant: Option<u8>,

    /// Model recommendation (0 or 1)
    #[serde(default)]
    pub recommendation: Option<u8>,
}

impl JobAd {
    /// Build a record from an arbitrary mapping.
    ///
    /// Keys outside the ten columns are ignored. Required fields are not
    /// checked, but `relevant` and `recommendation` must be 0 or 1.
    pub fn create(fields: &Map<String, Value>) -> Result<Self> {
        let known: Map<String, Value> = fields
            .iter()
            .filter(|(key, _)| key.parse::<Field>().is_ok())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let ad: Self = serde_json::from_value(Value::Object(known))?;
        check_flag(Field::Relevant, ad.relevant)?;
        check_flag(Field::Recommendation, ad.recommendation)?;
        Ok(ad)
    }

    /// Read a column by name. Unset columns read as `Value::Null`.
    pub fn get(&self, key: &str) -> Result<Value> {
        let value = match key.parse::<Field>()? {
            Field::Site => serde_json::to_value(&self.site)?,
            Field::SearchTerm => serde_json::to_value(&self.searchterm)?,
            Field::Id => serde_json::to_value(&self.id)?,
            Field::Title => serde_json::to_value(&self.title)?,
            Field::Url => serde_json::to_value(&self.url)?,
            Field::Description => serde_json::to_value(&self.description)?,
            Field::Date => serde_json::to_value(self.date)?,
            Field::Language => serde_json::to_value(self.language)?,
            Field::Relevant => serde_json::to_value(self.relevant)?,
            Field::Recommendation => serde_json::to_value(self.recommendation)?,
        };
        Ok(value)
    }

    /// Assign a column by name.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        match key.parse::<Field>()? {
            Field::Site => self.site = serde_json::from_value(value)?,
            Field::SearchTerm => self.searchterm = serde_json::from_value(value)?,
            Field::Id => self.id = serde_json::from_value(value)?,
            Field::Title => self.title = serde_json::from_value(value)?,
            Field::Url => self.url = serde_json::from_value(value)?,
            Field::Description => self.description = serde_json::from_value(value)?,
            Field::Date => self.date = serde_json::from_value(value)?,
            Field::Language => self.language = serde_json::from_value(value)?,
            Field::Relevant => {
                self.relevant = check_flag(Field::Relevant, serde_json::from_value(value)?)?
            }
            Field::Recommendation => {
                self.recommendation =
                    check_flag(Field::Recommendation, serde_json::from_value(value)?)?
            }
        }
        Ok(())
    }

    /// Reset a column to null.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.set(key, Value::Null)
    }

    /// True if the given column is set.
    pub fn is_set(&self, field: Field) -> bool {
        match field {
            Field::Site => self.site.is_some(),
            Field::SearchTerm => self.searchterm.is_some(),
            Field::Id => self.id.is_some(),
            Field::Title => self.title.is_some(),
            Field::Url => self.url.is_some(),
            Field::Description => self.description.is_some(),
            Field::Date => self.date.is_some(),
            Field::Language => self.language.is_some(),
            Field::Relevant => self.relevant.is_some(),
            Field::Recommendation => self.recommendation.is_some(),
        }
    }

    /// True if every named column is non-null.
    pub fn all_fields_present(&self, fields: &[Field]) -> bool {
        fields.iter().all(|field| self.is_set(*field))
    }

    /// Storage key: `(site, id)`.
    pub fn key(&self) -> Option<(&str, &str)> {
        Some((self.site.as_deref()?, self.id.as_deref()?))
    }

    /// Stamp the orchestrator-owned columns.
    pub fn stamp(&mut self, site: &str, searchterm: &str) {
        self.site = Some(site.to_string());
        self.searchterm = Some(searchterm.to_string());
    }
}

fn check_flag(field: Field, value: Option<u8>) -> Result<Option<u8>> {
    match value {
        None | Some(0) | Some(1) => Ok(value),
        Some(other) => Err(AppError::validation(format!(
            "{field} must be 0 or 1, got {other}"
        ))),
    }
}
