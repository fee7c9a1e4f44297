use crate::domain::upload::{ScriptParams, StagedInputs};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Program plus leading arguments, e.g. `python3.10 test.py`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessorCommand {
    pub program: String,
    pub args: Vec<String>,
}

/// One fully resolved processor run, passed as an argument vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn build(
        command: &ProcessorCommand,
        inputs: &StagedInputs,
        clips_dir: &Path,
        output_dir: &Path,
        params: &ScriptParams,
    ) -> Self {
        let mut args: Vec<OsString> = command.args.iter().map(OsString::from).collect();

        let mut flag = |name: &str, value: &OsStr| {
            args.push(OsString::from(name));
            args.push(value.to_os_string());
        };

        flag("--input_video", inputs.video.as_os_str());
        flag("--input_clips", clips_dir.as_os_str());
        flag("--input_mp3", inputs.audio.as_os_str());
        flag("--input_txt", inputs.text.as_os_str());
        flag("--output_dir", output_dir.as_os_str());
        flag("--font_file", inputs.font.as_os_str());
        flag("--font_size", OsStr::new(&params.font_size));
        flag("--font_color", OsStr::new(&params.font_color));
        flag("--bg_color", OsStr::new(&params.bg_color));
        flag("--margin", OsStr::new(&params.margin));

        Self {
            program: command.program.clone(),
            args,
        }
    }

    /// Value following `flag`, if present.
    pub fn flag_value(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {:?}", arg)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Succeeded,
    Failed,
}

/// Observable state of one background processor run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub status: JobStatus,
    pub exit_code: Option<i32>,
    pub error: Option<String>,
    pub output_dir: PathBuf,
    pub workspace: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    pub fn running(id: Uuid, output_dir: PathBuf, workspace: PathBuf) -> Self {
        Self {
            id,
            status: JobStatus::Running,
            exit_code: None,
            error: None,
            output_dir,
            workspace,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status != JobStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> StagedInputs {
        StagedInputs {
            video: PathBuf::from("tmp/x/video/in.mp4"),
            clips_archive: PathBuf::from("tmp/x/clips/clips.zip"),
            audio: PathBuf::from("tmp/x/mp3/track.mp3"),
            text: PathBuf::from("tmp/x/text/lines.txt"),
            font: PathBuf::from("tmp/x/font/font.ttf"),
        }
    }

    fn params() -> ScriptParams {
        ScriptParams {
            font_size: "48".to_string(),
            font_color: "white".to_string(),
            bg_color: "black".to_string(),
            margin: "20".to_string(),
        }
    }

    #[test]
    fn test_invocation_argument_order() {
        let command = ProcessorCommand {
            program: "python3.10".to_string(),
            args: vec!["test.py".to_string()],
        };
        let invocation = Invocation::build(
            &command,
            &inputs(),
            Path::new("tmp/x/clips"),
            Path::new("static/output_root/final"),
            &params(),
        );

        let args: Vec<String> = invocation
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(invocation.program, "python3.10");
        assert_eq!(
            args,
            vec![
                "test.py",
                "--input_video",
                "tmp/x/video/in.mp4",
                "--input_clips",
                "tmp/x/clips",
                "--input_mp3",
                "tmp/x/mp3/track.mp3",
                "--input_txt",
                "tmp/x/text/lines.txt",
                "--output_dir",
                "static/output_root/final",
                "--font_file",
                "tmp/x/font/font.ttf",
                "--font_size",
                "48",
                "--font_color",
                "white",
                "--bg_color",
                "black",
                "--margin",
                "20",
            ]
        );
    }

    #[test]
    fn test_hostile_values_stay_single_arguments() {
        let command = ProcessorCommand {
            program: "python3.10".to_string(),
            args: vec![],
        };
        let mut params = params();
        params.font_color = "white\"; touch /tmp/pwned; echo \"".to_string();

        let invocation = Invocation::build(
            &command,
            &inputs(),
            Path::new("clips"),
            Path::new("final"),
            &params,
        );

        assert_eq!(
            invocation.flag_value("--font_color"),
            Some(OsStr::new("white\"; touch /tmp/pwned; echo \""))
        );
        assert_eq!(invocation.args.len(), 20);
    }

    #[test]
    fn test_flag_value_missing() {
        let invocation = Invocation {
            program: "true".to_string(),
            args: vec![OsString::from("--output_dir")],
        };
        assert_eq!(invocation.flag_value("--output_dir"), None);
        assert_eq!(invocation.flag_value("--margin"), None);
    }
}
