//! Stage-type palette and status colours.
//!
//! Both are plain configuration values handed to whoever needs them; nothing
//! here is global.

use std::fmt;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::task::StageStatus;

/// One named stage type and its display colour (`#rrggbb`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageType {
    pub name: String,
    pub color: String,
}

impl StageType {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Ordered set of stage types offered to the editor.
///
/// Serialized as a list of `[name, colour]` pairs. The legacy
/// `{ "name": "colour" }` object form is accepted on load, keeping its order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePalette {
    entries: Vec<StageType>,
}

impl Default for StagePalette {
    fn default() -> Self {
        Self::new(vec![
            StageType::new("Preparation", "#f0ad4e"),
            StageType::new("Implementation", "#5bc0de"),
            StageType::new("Training/Adoption", "#5cb85c"),
        ])
    }
}

impl StagePalette {
    pub fn new(entries: Vec<StageType>) -> Self {
        let mut palette = Self { entries: Vec::new() };
        for entry in entries {
            palette.insert(entry);
        }
        palette
    }

    /// Insert or recolour a stage type; later names replace earlier ones.
    pub fn insert(&mut self, entry: StageType) {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => existing.color = entry.color,
            None => self.entries.push(entry),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn color_of(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.color.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageType> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for StagePalette {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for entry in &self.entries {
            seq.serialize_element(&(&entry.name, &entry.color))?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for StagePalette {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PaletteVisitor;

        impl<'de> Visitor<'de> for PaletteVisitor {
            type Value = StagePalette;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a list of [name, colour] pairs or a name → colour map")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some((name, color)) = seq.next_element::<(String, String)>()? {
                    entries.push(StageType { name, color });
                }
                Ok(StagePalette::new(entries))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some((name, color)) = map.next_entry::<String, String>()? {
                    entries.push(StageType { name, color });
                }
                Ok(StagePalette::new(entries))
            }
        }

        deserializer.deserialize_any(PaletteVisitor)
    }
}

/// Display colour per stage status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusColors {
    pub not_started: String,
    pub in_progress: String,
    pub completed: String,
}

impl Default for StatusColors {
    fn default() -> Self {
        Self {
            not_started: "#c0504d".into(),
            in_progress: "#4f81bd".into(),
            completed: "#5cb85c".into(),
        }
    }
}

impl StatusColors {
    pub fn color_of(&self, status: StageStatus) -> &str {
        match status {
            StageStatus::NotStarted => &self.not_started,
            StageStatus::InProgress => &self.in_progress,
            StageStatus::Completed => &self.completed,
        }
    }
}
