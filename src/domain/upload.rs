use std::collections::HashMap;
use std::path::PathBuf;

/// The five files an upload must carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    Video,
    Clips,
    Audio,
    Text,
    Font,
}

impl InputKind {
    pub const ALL: [InputKind; 5] = [
        InputKind::Video,
        InputKind::Clips,
        InputKind::Audio,
        InputKind::Text,
        InputKind::Font,
    ];

    /// Multipart field name used by the upload form.
    pub fn field_name(self) -> &'static str {
        match self {
            InputKind::Video => "video_file",
            InputKind::Clips => "clips_folder",
            InputKind::Audio => "mp3_file",
            InputKind::Text => "text_file",
            InputKind::Font => "font_file",
        }
    }

    /// Workspace subdirectory the file is staged in.
    pub fn dir_name(self) -> &'static str {
        match self {
            InputKind::Video => "video",
            InputKind::Clips => "clips",
            InputKind::Audio => "mp3",
            InputKind::Text => "text",
            InputKind::Font => "font",
        }
    }

    pub fn from_field(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.field_name() == name)
    }
}

pub const FONT_SIZE_FIELD: &str = "font_size";
pub const FONT_COLOR_FIELD: &str = "font_color";
pub const BG_COLOR_FIELD: &str = "bg_color";
pub const MARGIN_FIELD: &str = "margin";

pub const TEXT_FIELDS: [&str; 4] =
    [FONT_SIZE_FIELD, FONT_COLOR_FIELD, BG_COLOR_FIELD, MARGIN_FIELD];

/// Paths of the staged upload files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedInputs {
    pub video: PathBuf,
    pub clips_archive: PathBuf,
    pub audio: PathBuf,
    pub text: PathBuf,
    pub font: PathBuf,
}

impl StagedInputs {
    /// `None` unless all five kinds are present.
    pub fn collect(mut files: HashMap<InputKind, PathBuf>) -> Option<Self> {
        Some(Self {
            video: files.remove(&InputKind::Video)?,
            clips_archive: files.remove(&InputKind::Clips)?,
            audio: files.remove(&InputKind::Audio)?,
            text: files.remove(&InputKind::Text)?,
            font: files.remove(&InputKind::Font)?,
        })
    }
}

/// Text parameters forwarded to the processor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptParams {
    pub font_size: String,
    pub font_color: String,
    pub bg_color: String,
    pub margin: String,
}

impl ScriptParams {
    /// Empty values count as missing. `margin` falls back to `default_margin`.
    pub fn from_fields(fields: &HashMap<String, String>, default_margin: &str) -> Option<Self> {
        let value = |key: &str| fields.get(key).filter(|v| !v.is_empty()).cloned();

        Some(Self {
            font_size: value(FONT_SIZE_FIELD)?,
            font_color: value(FONT_COLOR_FIELD)?,
            bg_color: value(BG_COLOR_FIELD)?,
            margin: value(MARGIN_FIELD).unwrap_or_else(|| default_margin.to_string()),
        })
    }
}
