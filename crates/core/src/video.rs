//! Video catalog records, role tags and form handling.
//!
//! A [`Video`] is a clip that can be placed into sequences. Its [`Role`]
//! constrains where it may sit in a structurally valid sequence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Structural position a clip is meant to occupy in a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Beginning,
    Middle,
    End,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Beginning, Role::Middle, Role::End];

    /// Stored / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Beginning => "beginning",
            Role::Middle => "middle",
            Role::End => "end",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Role::Beginning => "Beginning",
            Role::Middle => "Middle",
            Role::End => "End",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginning" => Ok(Role::Beginning),
            "middle" => Ok(Role::Middle),
            "end" => Ok(Role::End),
            other => Err(CoreError::Validation(format!(
                "Unknown role '{other}'. Must be one of: beginning, middle, end"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A clip in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub role: Role,
    pub duration_seconds: Option<i32>,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Video {
    /// Reject records a store should never have produced.
    pub fn ensure_well_formed(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "video {} has an empty title",
                self.id
            )));
        }
        if self.url.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "video {} has an empty url",
                self.id
            )));
        }
        if let Some(d) = self.duration_seconds {
            if d < 0 {
                return Err(CoreError::Validation(format!(
                    "video {} has negative duration {d}",
                    self.id
                )));
            }
        }
        Ok(())
    }

    /// Case-insensitive match against the title or any tag.
    ///
    /// An empty query matches everything.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }
}

/// DTO for creating a new video.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateVideo {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub role: Role,
    #[validate(range(min = 0, message = "duration must be non-negative"))]
    pub duration_seconds: Option<i32>,
    pub tags: Vec<String>,
}

/// DTO for updating a video. Only `Some` fields are applied.
///
/// The optional columns use `Option<Option<T>>`: `Some(None)` clears the
/// stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateVideo {
    #[validate(custom(function = "not_blank"))]
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    #[validate(custom(function = "not_blank"))]
    pub url: Option<String>,
    pub thumbnail_url: Option<Option<String>>,
    pub role: Option<Role>,
    #[validate(range(min = 0, message = "duration must be non-negative"))]
    pub duration_seconds: Option<Option<i32>>,
    pub tags: Option<Vec<String>>,
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Form handling
// ---------------------------------------------------------------------------

/// Raw field values as an editing form delivers them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoForm {
    pub title: String,
    pub description: String,
    pub url: String,
    pub thumbnail_url: String,
    pub role: Option<Role>,
    pub duration_seconds: String,
    /// Comma-separated.
    pub tags: String,
}

impl VideoForm {
    /// Pre-fill a form from an existing video.
    pub fn from_video(video: &Video) -> Self {
        Self {
            title: video.title.clone(),
            description: video.description.clone().unwrap_or_default(),
            url: video.url.clone(),
            thumbnail_url: video.thumbnail_url.clone().unwrap_or_default(),
            role: Some(video.role),
            duration_seconds: video
                .duration_seconds
                .map(|d| d.to_string())
                .unwrap_or_default(),
            tags: video.tags.join(", "),
        }
    }

    /// Normalise the form into a validated [`CreateVideo`].
    pub fn to_create(&self) -> Result<CreateVideo, CoreError> {
        let role = self
            .role
            .ok_or_else(|| CoreError::Validation("role is required".to_string()))?;
        let input = CreateVideo {
            title: self.title.trim().to_string(),
            description: non_empty(&self.description),
            url: self.url.trim().to_string(),
            thumbnail_url: non_empty(&self.thumbnail_url),
            role,
            duration_seconds: parse_duration(&self.duration_seconds)?,
            tags: parse_tags(&self.tags),
        };
        input.validate()?;
        Ok(input)
    }

    /// Same normalisation as [`to_create`](Self::to_create), expressed as a full patch.
    ///
    /// Blank optional fields clear the stored value.
    pub fn to_update(&self) -> Result<UpdateVideo, CoreError> {
        let c = self.to_create()?;
        Ok(UpdateVideo {
            title: Some(c.title),
            description: Some(c.description),
            url: Some(c.url),
            thumbnail_url: Some(c.thumbnail_url),
            role: Some(c.role),
            duration_seconds: Some(c.duration_seconds),
            tags: Some(c.tags),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse an optional whole-second duration. Blank input means "unknown".
pub fn parse_duration(value: &str) -> Result<Option<i32>, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let secs: i32 = trimmed.parse().map_err(|_| {
        CoreError::Validation(format!("duration '{trimmed}' is not a whole number of seconds"))
    })?;
    if secs < 0 {
        return Err(CoreError::Validation(format!(
            "duration must be non-negative, got {secs}"
        )));
    }
    Ok(Some(secs))
}

/// Split a comma-separated tag list.
///
/// Tags are trimmed, blanks dropped, and repeats removed keeping the first
/// occurrence, so the result is an ordered set.
pub fn parse_tags(value: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Render a duration as `m:ss`; unknown or zero renders as an em dash.
pub fn format_duration(seconds: Option<i32>) -> String {
    match seconds {
        Some(s) if s > 0 => format!("{}:{:02}", s / 60, s % 60),
        _ => "\u{2014}".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
