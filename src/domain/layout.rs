//! Filesystem layout of the output area and the per-request workspaces.

use crate::domain::upload::InputKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

/// Where jobs write their results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLayout {
    /// Every job writes into the single `final` directory, wiped on each upload.
    Shared,
    /// Every job writes into `jobs/<id>`; nothing is wiped globally.
    Isolated,
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownLayout(pub String);

impl fmt::Display for UnknownLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown output layout: {}", self.0)
    }
}

impl std::error::Error for UnknownLayout {}

impl FromStr for OutputLayout {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(OutputLayout::Shared),
            "isolated" => Ok(OutputLayout::Isolated),
            other => Err(UnknownLayout(other.to_string())),
        }
    }
}

/// Resolves every directory the server reads or writes.
#[derive(Clone, Debug)]
pub struct Layout {
    output_root: PathBuf,
    tmp_root: PathBuf,
    mode: OutputLayout,
}

impl Layout {
    pub fn new(
        output_root: impl Into<PathBuf>,
        tmp_root: impl Into<PathBuf>,
        mode: OutputLayout,
    ) -> Self {
        Self {
            output_root: output_root.into(),
            tmp_root: tmp_root.into(),
            mode,
        }
    }

    pub fn mode(&self) -> OutputLayout {
        self.mode
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn tmp_root(&self) -> &Path {
        &self.tmp_root
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.output_root.join("output")
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.scratch_dir().join("videos")
    }

    pub fn audios_dir(&self) -> PathBuf {
        self.scratch_dir().join("audios")
    }

    /// The shared results directory served under `/download/`.
    pub fn final_dir(&self) -> PathBuf {
        self.output_root.join("final")
    }

    pub fn job_output_dir(&self, id: &Uuid) -> PathBuf {
        self.output_root.join("jobs").join(id.to_string())
    }

    /// Directory handed to the processor as `--output_dir`.
    pub fn output_dir_for(&self, id: &Uuid) -> PathBuf {
        match self.mode {
            OutputLayout::Shared => self.final_dir(),
            OutputLayout::Isolated => self.job_output_dir(id),
        }
    }

    /// Directories wiped at the start of an upload in the shared layout.
    pub fn shared_dirs(&self) -> [PathBuf; 3] {
        [self.videos_dir(), self.audios_dir(), self.final_dir()]
    }

    pub fn workspace(&self, id: Uuid) -> Workspace {
        Workspace {
            id,
            root: self.tmp_root.join(id.to_string()),
        }
    }
}

/// Per-request staging tree: `<tmp>/<id>/{video,clips,mp3,text,font}`.
#[derive(Clone, Debug)]
pub struct Workspace {
    pub id: Uuid,
    pub root: PathBuf,
}

impl Workspace {
    pub fn dir(&self, kind: InputKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    pub fn dirs(&self) -> impl Iterator<Item = PathBuf> + '_ {
        InputKind::ALL.iter().map(move |kind| self.dir(*kind))
    }
}
