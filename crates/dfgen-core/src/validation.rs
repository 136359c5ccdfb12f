use core::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

use crate::error::Error;
use crate::grammar;
use crate::instruction;

/// Outcome of checking one candidate value.
///
/// Rejection is a value, not an error: the reason is meant to be shown to
/// the person who typed the value, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(String),
}

impl Validation {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }

    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}

impl From<Result<(), String>> for Validation {
    fn from(value: Result<(), String>) -> Self {
        match value {
            Ok(()) => Self::Valid,
            Err(reason) => Self::Invalid(reason),
        }
    }
}

/// Which grammar applies to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    DirectoryPath,
    DirectoryFormat,
    PortList,
    KeyValueList,
    ShellCommand,
    Identifier,
    BuildArg,
    HealthcheckSpec,
    Signal,
    UserGroup,
    VolumePath,
    InstructionLine,
}

impl FieldKind {
    pub const ALL: [Self; 12] = [
        Self::DirectoryPath,
        Self::DirectoryFormat,
        Self::PortList,
        Self::KeyValueList,
        Self::ShellCommand,
        Self::Identifier,
        Self::BuildArg,
        Self::HealthcheckSpec,
        Self::Signal,
        Self::UserGroup,
        Self::VolumePath,
        Self::InstructionLine,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DirectoryPath => "directory-path",
            Self::DirectoryFormat => "directory-format",
            Self::PortList => "port-list",
            Self::KeyValueList => "key-value-list",
            Self::ShellCommand => "shell-command",
            Self::Identifier => "identifier",
            Self::BuildArg => "build-arg",
            Self::HealthcheckSpec => "healthcheck",
            Self::Signal => "signal",
            Self::UserGroup => "user-group",
            Self::VolumePath => "volume-path",
            Self::InstructionLine => "instruction-line",
        }
    }

    /// Only `DirectoryPath` touches `probe`; every other kind is a pure
    /// string check and never returns `Err`.
    pub fn validate(self, raw: &str, probe: &dyn PathProbe) -> Result<Validation, Error> {
        match self.validate_text(raw) {
            Some(validation) => Ok(validation),
            None => grammar::validate_directory_path(raw, probe),
        }
    }

    /// Checks `raw` without touching the filesystem. `None` for
    /// `DirectoryPath`, whose answer depends on what exists on disk.
    pub fn validate_text(self, raw: &str) -> Option<Validation> {
        let validation = match self {
            Self::DirectoryPath => return None,
            Self::DirectoryFormat => grammar::validate_directory_format(raw),
            Self::PortList => grammar::validate_port_list(raw),
            Self::KeyValueList => grammar::validate_key_value_list(raw),
            Self::ShellCommand => grammar::validate_shell_command(raw),
            Self::Identifier => grammar::validate_identifier(raw),
            Self::BuildArg => grammar::validate_build_arg(raw),
            Self::HealthcheckSpec => grammar::validate_healthcheck(raw),
            Self::Signal => grammar::validate_signal(raw),
            Self::UserGroup => grammar::validate_user_group(raw),
            Self::VolumePath => grammar::validate_volume_path(raw),
            Self::InstructionLine => instruction::validate_instruction_line(raw),
        };
        Some(validation)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownFieldKind {
                name: s.to_string(),
                expected: Self::ALL.map(Self::as_str).join(", "),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Directory,
    Other,
}

/// Answers "what is at this path right now".
///
/// `Ok(None)` means nothing exists there. Any `Err` is an environment
/// failure and must not be reported as a bad path.
pub trait PathProbe {
    fn probe(&self, path: &Path) -> std::io::Result<Option<PathKind>>;
}

impl<F> PathProbe for F
where
    F: Fn(&Path) -> std::io::Result<Option<PathKind>>,
{
    fn probe(&self, path: &Path) -> std::io::Result<Option<PathKind>> {
        self(path)
    }
}

/// Probes the real filesystem of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn probe(&self, path: &Path) -> std::io::Result<Option<PathKind>> {
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => Ok(Some(PathKind::Directory)),
            Ok(_) => Ok(Some(PathKind::Other)),
            Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::grammar::SINGLE_LINE;
    use crate::validation::{FieldKind, FsProbe, PathKind, PathProbe, Validation};

    #[test]
    fn field_kind_names_round_trip() {
        for kind in FieldKind::ALL {
            let parsed: FieldKind = kind.as_str().parse().expect("kind name should parse");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn unknown_field_kind_lists_choices() {
        let error = "ports".parse::<FieldKind>().expect_err("kind should be unknown");
        let rendered = error.to_string();
        assert!(rendered.contains("'ports'"));
        assert!(rendered.contains("port-list"));
        assert!(rendered.contains("instruction-line"));
    }

    #[test]
    fn whitespace_only_is_valid_for_every_kind() {
        for kind in FieldKind::ALL {
            let result = kind
                .validate("   ", &FsProbe)
                .expect("blank input should never touch the filesystem");
            assert_eq!(result, Validation::Valid, "{kind} should accept blank input");
        }
    }

    #[test]
    fn every_kind_rejects_embedded_line_breaks() {
        let on_disk = |_: &Path| -> std::io::Result<Option<PathKind>> {
            Ok(Some(PathKind::Directory))
        };

        for kind in FieldKind::ALL {
            for value in ["a\nb", "a\r\nb", "a\rb"] {
                let result = kind
                    .validate(value, &on_disk)
                    .expect("line breaks are rejected before any probe");
                assert_eq!(
                    result,
                    Validation::invalid(SINGLE_LINE),
                    "{kind} should reject {value:?}"
                );
            }
        }
    }

    #[test]
    fn validate_text_leaves_directory_path_to_the_probe() {
        assert_eq!(FieldKind::DirectoryPath.validate_text("/tmp"), None);
        assert_eq!(
            FieldKind::PortList.validate_text("80 443"),
            Some(Validation::Valid)
        );
    }

    #[test]
    fn fs_probe_distinguishes_missing_file_and_directory() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let file = dir.path().join("Dockerfile");
        std::fs::write(&file, "FROM alpine\n").expect("file write should succeed");

        assert_eq!(
            FsProbe.probe(dir.path()).expect("probe should succeed"),
            Some(PathKind::Directory)
        );
        assert_eq!(
            FsProbe.probe(&file).expect("probe should succeed"),
            Some(PathKind::Other)
        );
        assert_eq!(
            FsProbe
                .probe(&dir.path().join("missing"))
                .expect("probe should succeed"),
            None
        );
        assert_eq!(
            FsProbe
                .probe(&file.join("nested"))
                .expect("probe through a file should succeed"),
            None
        );
        assert_eq!(
            FsProbe
                .probe(Path::new("/invalid/path"))
                .expect("probe should succeed"),
            None
        );
    }
}
