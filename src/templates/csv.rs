//! # Template Files
//!
//! Reading room templates from the header-prefixed, comma-delimited record
//! format produced by the level editor export.
//!
//! Each record line is `tileId,localX,localY,mutable,isChunkTemplate`.
//! Coordinates may be written as floats and are truncated toward zero.
//! Missing or empty boolean fields default to `false`; quoted fields and
//! `\r\n` line endings are handled by the `csv` reader.
//!
//! The theme and signature of a template come from its file name:
//! `roomData_<theme>_<signature>_<identifier>.csv`, for example
//! `roomData_Theme1_UO_RC_DO_LC_boss.csv`. The `roomData` prefix is optional.

use super::{RoomTemplate, TemplateStore, Theme, TileRecord};
use crate::{ConnectivitySignature, Position, RoomweaveError, RoomweaveResult};
use ::csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

const FILE_PREFIX: &str = "roomData";
const HEADER: [&str; 5] = [
    "TileId",
    "TileLocationX",
    "TileLocationY",
    "Mutateable",
    "IsChunkTemplate",
];

/// Theme, signature and identifier decoded from a template file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFileName {
    pub theme: Theme,
    pub signature: ConnectivitySignature,
    pub identifier: String,
}

impl TemplateFileName {
    /// Parses a file stem (no extension).
    ///
    /// # Examples
    ///
    /// ```
    /// use roomweave::TemplateFileName;
    ///
    /// let name = TemplateFileName::parse("roomData_Theme2_UO_RC_DC_LO_loot").unwrap();
    /// assert_eq!(name.theme.as_str(), "Theme2");
    /// assert_eq!(name.signature.to_string(), "UO_RC_DC_LO");
    /// assert_eq!(name.identifier, "loot");
    /// ```
    pub fn parse(stem: &str) -> Option<Self> {
        let mut tokens: Vec<&str> = stem.split('_').collect();
        if tokens.first() == Some(&FILE_PREFIX) {
            tokens.remove(0);
        }

        // The theme needs at least one token before the signature.
        for start in 1..tokens.len().saturating_sub(3) {
            let label = tokens[start..start + 4].join("_");
            if let Ok(signature) = label.parse::<ConnectivitySignature>() {
                return Some(Self {
                    theme: Theme::new(tokens[..start].join("_")),
                    signature,
                    identifier: tokens[start + 4..].join("_"),
                });
            }
        }
        None
    }

    /// File stem for this name, the inverse of [`TemplateFileName::parse`].
    pub fn to_stem(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            FILE_PREFIX, self.theme, self.signature, self.identifier
        )
    }
}

/// Field names for the record columns, in file order.
const RECORD_FIELDS: [&str; 5] = ["tile_id", "x", "y", "mutable", "chunk"];

/// One record row as stored on disk. Columns are matched by position, not
/// by the header text.
#[derive(Debug, Deserialize, Serialize)]
struct RecordRow {
    tile_id: u32,
    x: f32,
    y: f32,
    #[serde(default, deserialize_with = "deserialize_flag")]
    mutable: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    chunk: bool,
}

impl From<&TileRecord> for RecordRow {
    fn from(r: &TileRecord) -> Self {
        Self {
            tile_id: r.tile_id,
            x: r.local.x as f32,
            y: r.local.y as f32,
            mutable: r.mutable,
            chunk: r.chunk,
        }
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = String::deserialize(deserializer)?;
    parse_flag(&value).map_err(serde::de::Error::custom)
}

/// Parses template records. The first line is the header; blank lines are
/// ignored.
pub fn parse_records(source_name: &str, text: &str) -> RoomweaveResult<Vec<TileRecord>> {
    let error = |line: usize, message: String| RoomweaveError::TemplateParse {
        source_name: source_name.to_string(),
        line,
        message,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());
    let fields = StringRecord::from(RECORD_FIELDS.to_vec());
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row.map_err(|e| {
            let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
            error(line, e.to_string())
        })?;
        let line = row.position().map(|p| p.line() as usize).unwrap_or(0);
        let parsed: RecordRow = row
            .deserialize(Some(&fields))
            .map_err(|e| error(line, e.to_string()))?;

        let (Some(x), Some(y)) = (truncate_coordinate(parsed.x), truncate_coordinate(parsed.y))
        else {
            return Err(error(line, "coordinates must be finite".to_string()));
        };
        let record = TileRecord {
            tile_id: parsed.tile_id,
            local: Position::new(x, y),
            mutable: parsed.mutable,
            chunk: parsed.chunk,
        };
        if !record.in_extent() {
            return Err(error(
                line,
                format!("tile at {} is outside the template extent", record.local),
            ));
        }
        records.push(record);
    }

    Ok(records)
}

fn truncate_coordinate(value: f32) -> Option<i32> {
    value.is_finite().then_some(value as i32)
}

fn parse_flag(value: &str) -> Result<bool, String> {
    if value.is_empty() || value.eq_ignore_ascii_case("false") || value == "0" {
        Ok(false)
    } else if value.eq_ignore_ascii_case("true") || value == "1" {
        Ok(true)
    } else {
        Err(format!("bad boolean '{}'", value))
    }
}

/// Writes records in the template file format, header first.
pub fn format_records(records: &[TileRecord]) -> RoomweaveResult<String> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(RecordRow::from(record))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| RoomweaveError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| RoomweaveError::InvalidState(e.to_string()))
}

/// Loads a single template file; its name must follow the template naming scheme.
pub fn load_template_file(path: &Path) -> RoomweaveResult<RoomTemplate> {
    let display = path.display().to_string();
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let name = TemplateFileName::parse(stem).ok_or_else(|| RoomweaveError::TemplateParse {
        source_name: display.clone(),
        line: 0,
        message: "file name does not encode a theme and signature".to_string(),
    })?;

    let text = fs::read_to_string(path)?;
    let records = parse_records(&display, &text)?;
    Ok(RoomTemplate::new(
        name.theme,
        name.signature,
        name.identifier,
        records,
    ))
}

impl TemplateStore {
    /// Loads every `.csv` template below `root`, recursing into subdirectories.
    ///
    /// Files whose names do not encode a theme and signature are skipped
    /// with a warning; malformed contents are an error.
    pub fn load_dir(root: impl AsRef<Path>) -> RoomweaveResult<Self> {
        let mut store = Self::new();
        let mut pending = vec![root.as_ref().to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut entries: Vec<_> = fs::read_dir(&dir)?
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .map(|e| e.path())
                .collect();
            entries.sort();

            for path in entries {
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                    continue;
                }

                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
                if TemplateFileName::parse(stem).is_none() {
                    log::warn!("Skipping template with unrecognised name: {}", path.display());
                    continue;
                }
                store.insert(load_template_file(&path)?)?;
            }
        }

        log::info!(
            "Loaded {} templates from {}",
            store.len(),
            root.as_ref().display()
        );
        Ok(store)
    }
}
