use core::fmt;

use crate::grammar::{SINGLE_LINE, is_single_line};
use crate::validation::{FieldKind, Validation};

/// The closed set of keywords an ONBUILD trigger may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    Add,
    Arg,
    Cmd,
    Copy,
    Entrypoint,
    Env,
    Expose,
    From,
    Healthcheck,
    Label,
    Onbuild,
    Run,
    Shell,
    Stopsignal,
    User,
    Volume,
    Workdir,
}

impl Instruction {
    /// Sorted by keyword.
    pub const ALL: [Self; 17] = [
        Self::Add,
        Self::Arg,
        Self::Cmd,
        Self::Copy,
        Self::Entrypoint,
        Self::Env,
        Self::Expose,
        Self::From,
        Self::Healthcheck,
        Self::Label,
        Self::Onbuild,
        Self::Run,
        Self::Shell,
        Self::Stopsignal,
        Self::User,
        Self::Volume,
        Self::Workdir,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Arg => "ARG",
            Self::Cmd => "CMD",
            Self::Copy => "COPY",
            Self::Entrypoint => "ENTRYPOINT",
            Self::Env => "ENV",
            Self::Expose => "EXPOSE",
            Self::From => "FROM",
            Self::Healthcheck => "HEALTHCHECK",
            Self::Label => "LABEL",
            Self::Onbuild => "ONBUILD",
            Self::Run => "RUN",
            Self::Shell => "SHELL",
            Self::Stopsignal => "STOPSIGNAL",
            Self::User => "USER",
            Self::Volume => "VOLUME",
            Self::Workdir => "WORKDIR",
        }
    }

    /// Case-sensitive: `run` is not `RUN`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|instruction| instruction.as_str() == keyword)
    }

    /// Grammar for the arguments of this instruction, if it has one.
    ///
    /// `None` means the arguments are accepted without a structural check.
    pub const fn argument_kind(self) -> Option<FieldKind> {
        match self {
            Self::Arg => Some(FieldKind::BuildArg),
            Self::Cmd | Self::Entrypoint | Self::Run => Some(FieldKind::ShellCommand),
            Self::Env | Self::Label => Some(FieldKind::KeyValueList),
            Self::Expose => Some(FieldKind::PortList),
            Self::Healthcheck => Some(FieldKind::HealthcheckSpec),
            Self::Stopsignal => Some(FieldKind::Signal),
            Self::User => Some(FieldKind::UserGroup),
            Self::Volume => Some(FieldKind::VolumePath),
            Self::Workdir => Some(FieldKind::DirectoryFormat),
            Self::Add | Self::Copy | Self::From | Self::Onbuild | Self::Shell => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates one instruction line, e.g. the trigger of an ONBUILD.
///
/// The keyword must belong to the vocabulary; its arguments are then checked
/// with the grammar from [`Instruction::argument_kind`]. A nested ONBUILD is
/// not descended into. The whole line must fit on one line, whatever the
/// keyword.
pub fn validate_instruction_line(raw: &str) -> Validation {
    let line = raw.trim();
    if !is_single_line(line) {
        return Validation::invalid(SINGLE_LINE);
    }
    let Some(keyword) = line.split_whitespace().next() else {
        return Validation::Valid;
    };

    let Some(instruction) = Instruction::from_keyword(keyword) else {
        return Validation::invalid(format!(
            "Invalid instruction: '{keyword}'. Must be one of: {}",
            Instruction::ALL.map(Instruction::as_str).join(", ")
        ));
    };

    let arguments = line[keyword.len()..].trim_start();
    instruction
        .argument_kind()
        .and_then(|kind| kind.validate_text(arguments))
        .unwrap_or(Validation::Valid)
}
