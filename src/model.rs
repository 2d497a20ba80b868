//! Catalog data model.
//!
//! `RawMember` mirrors the loosely-typed JSON members authored by hand;
//! `EntityRecord` is the structured record the rest of the crate works with.
//! Every optional field defaults to empty so display code never has to
//! special-case absent data.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::paths::BasePath;

/// Scalar fields with a dedicated slot in the overlay, in display order.
pub const DISPLAY_FIELDS: [&str; 5] = ["sex", "age", "height", "first", "second"];

/// Number of titled note blocks (`T1`/`N1` .. `T3`/`N3`).
pub const NOTE_BLOCKS: usize = 3;

/// One image in an overlay gallery.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, alias = "title")]
    pub caption: String,
}

/// A heading plus its paragraphs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NoteBlock {
    pub title: String,
    pub paragraphs: Vec<String>,
}

impl NoteBlock {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.paragraphs.is_empty()
    }
}

/// One catalog item. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EntityRecord {
    pub id: String,
    pub name: String,
    pub name_en: String,
    /// Portrait image, already resolved against the base path.
    pub img: String,
    /// Vertical focus hint for the portrait crop (e.g. `"8%"`).
    pub focus_y: String,
    /// String-valued display attributes keyed by their source field name.
    pub fields: BTreeMap<String, String>,
    pub overview: Vec<String>,
    pub details: Vec<String>,
    pub voice: Vec<String>,
    pub link: Vec<String>,
    pub notes: Vec<NoteBlock>,
    /// Gallery sequence; sources already resolved against the base path.
    pub images: Vec<GalleryImage>,
}

impl EntityRecord {
    /// Display field by name; missing fields read as `""`.
    pub fn field(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn has_identity(&self) -> bool {
        !self.id.is_empty() || !self.name.is_empty() || !self.name_en.is_empty()
    }

    /// Best human-readable label, used for alt text and logs.
    pub fn label(&self) -> &str {
        [&self.name, &self.name_en, &self.id]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn has_gallery(&self) -> bool {
        !self.images.is_empty()
    }
}

/// Accept `"text"`, `["a", "b"]`, `null`, or absence.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) if s.is_empty() => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

/// Accept a string, a number or a boolean as text. Anything else reads as
/// absent, so one odd value never fails the whole document.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Accept an array of images or a single image URL.
fn gallery_images<'de, D>(deserializer: D) -> Result<Vec<GalleryImage>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Images {
        Single(String),
        Many(Vec<GalleryImage>),
    }

    Ok(match Option::<Images>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Images::Single(src)) if src.is_empty() => Vec::new(),
        Some(Images::Single(src)) => vec![GalleryImage {
            src,
            ..GalleryImage::default()
        }],
        Some(Images::Many(v)) => v.into_iter().filter(|im| !im.src.is_empty()).collect(),
    })
}

/// Member record exactly as it appears in a data document.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawMember {
    #[serde(default, deserialize_with = "scalar_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: Option<String>,
    #[serde(default, rename = "nameEn", deserialize_with = "scalar_text")]
    pub name_en: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub img: Option<String>,
    #[serde(default, rename = "focusY", deserialize_with = "scalar_text")]
    pub focus_y: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub overview: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub details: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub voice: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub link: Vec<String>,
    #[serde(default, rename = "T1", deserialize_with = "scalar_text")]
    pub t1: Option<String>,
    #[serde(default, rename = "N1", deserialize_with = "one_or_many")]
    pub n1: Vec<String>,
    #[serde(default, rename = "T2", deserialize_with = "scalar_text")]
    pub t2: Option<String>,
    #[serde(default, rename = "N2", deserialize_with = "one_or_many")]
    pub n2: Vec<String>,
    #[serde(default, rename = "T3", deserialize_with = "scalar_text")]
    pub t3: Option<String>,
    #[serde(default, rename = "N3", deserialize_with = "one_or_many")]
    pub n3: Vec<String>,
    #[serde(default, deserialize_with = "gallery_images")]
    pub images: Vec<GalleryImage>,
    /// Every other key; string and number values become display fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RawMember {
    /// Build the structured record, resolving image references against `base`.
    pub fn into_record(self, base: &BasePath) -> EntityRecord {
        let fields = self
            .extra
            .into_iter()
            .filter_map(|(k, v)| match v {
                serde_json::Value::String(s) => Some((k, s)),
                serde_json::Value::Number(n) => Some((k, n.to_string())),
                _ => None,
            })
            .collect();

        let notes = [(self.t1, self.n1), (self.t2, self.n2), (self.t3, self.n3)]
            .into_iter()
            .map(|(title, paragraphs)| NoteBlock {
                title: title.unwrap_or_default(),
                paragraphs,
            })
            .collect();

        let images = self
            .images
            .into_iter()
            .map(|im| GalleryImage {
                src: base.resolve(&im.src),
                ..im
            })
            .collect();

        EntityRecord {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            name_en: self.name_en.unwrap_or_default(),
            img: base.resolve(self.img.as_deref().unwrap_or("")),
            focus_y: self.focus_y.unwrap_or_default(),
            fields,
            overview: self.overview,
            details: self.details,
            voice: self.voice,
            link: self.link,
            notes,
            images,
        }
    }
}

/// A titled group of members.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawGroup {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub members: Vec<RawMember>,
}

/// Top-level data document: `{ "groups": [...] }`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub groups: Vec<RawGroup>,
}

impl CatalogDocument {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
