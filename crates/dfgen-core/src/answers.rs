use std::path::Path;

use serde::Deserialize;

use crate::error::Error;
use crate::healthcheck::{Healthcheck, parse_healthcheck};
use crate::validation::{FieldKind, PathProbe, Validation};

pub const BASE_IMAGE_REQUIRED: &str = "A base image is required (e.g. node:20-alpine).";
pub const BASE_IMAGE_SINGLE: &str =
    "The base image must be a single image reference without spaces (e.g. node:20-alpine).";
pub const HEALTHCHECK_CMD_TWICE: &str =
    "The health check options already contain a CMD clause. Leave the health check command empty.";
pub const HEALTHCHECK_NONE_WITH_CMD: &str =
    "A health check of NONE runs no command. Leave the health check command empty.";

/// Values that end up in the generated Dockerfile, one per prompt.
///
/// Missing keys in an answers file take the same defaults the prompts offer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Answers {
    pub base_image: String,
    pub copy_source: String,
    pub copy_destination: String,
    pub expose_ports: String,
    pub environment: String,
    pub cmd: String,
    pub arg: String,
    pub entrypoint: String,
    pub healthcheck: String,
    pub healthcheck_cmd: String,
    pub label: String,
    pub onbuild: String,
    pub stopsignal: String,
    pub user: String,
    pub volume: String,
}

impl Default for Answers {
    fn default() -> Self {
        let mut answers = Self {
            base_image: String::new(),
            copy_source: String::new(),
            copy_destination: String::new(),
            expose_ports: String::new(),
            environment: String::new(),
            cmd: String::new(),
            arg: String::new(),
            entrypoint: String::new(),
            healthcheck: String::new(),
            healthcheck_cmd: String::new(),
            label: String::new(),
            onbuild: String::new(),
            stopsignal: String::new(),
            user: String::new(),
            volume: String::new(),
        };
        for field in &FIELDS {
            if let (Some(default), Some(slot)) = (field.default, answers.get_mut(field.key)) {
                *slot = default.to_string();
            }
        }
        answers
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub key: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    ImageReference,
    Grammar(FieldKind),
}

impl Rule {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ImageReference => "image",
            Self::Grammar(kind) => kind.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub message: &'static str,
    pub default: Option<&'static str>,
    pub rule: Rule,
}

impl Field {
    pub fn check(&self, raw: &str, probe: &dyn PathProbe) -> Result<Validation, Error> {
        match self.rule {
            Rule::ImageReference => Ok(validate_image_reference(raw)),
            Rule::Grammar(kind) => kind.validate(raw, probe),
        }
    }
}

/// Prompts in the order they are asked.
pub const FIELDS: [Field; 15] = [
    Field {
        key: "base_image",
        message: "Enter the base image of your container (e.g., \"node:14\"):",
        default: Some("node:14"),
        rule: Rule::ImageReference,
    },
    Field {
        key: "copy_source",
        message: "What folder to copy from? (optional, e.g., \"./src\"):",
        default: Some("./"),
        rule: Rule::Grammar(FieldKind::DirectoryPath),
    },
    Field {
        key: "copy_destination",
        message: "What's the destination folder? (optional, e.g., \"/app\"):",
        default: Some("./"),
        rule: Rule::Grammar(FieldKind::DirectoryFormat),
    },
    Field {
        key: "expose_ports",
        message: "Enter the ports to expose the container to the host (optional, e.g., \"8080 3000\"):",
        default: None,
        rule: Rule::Grammar(FieldKind::PortList),
    },
    Field {
        key: "environment",
        message: "Enter container's environment variables (optional, separated by spaces, e.g., \"<KEY>=<VALUE> <KEY>=<VALUE>\"):",
        default: None,
        rule: Rule::Grammar(FieldKind::KeyValueList),
    },
    Field {
        key: "cmd",
        message: "Enter the command to run when the container starts (optional, shell form, e.g., \"npm start\"):",
        default: Some("npm start"),
        rule: Rule::Grammar(FieldKind::ShellCommand),
    },
    Field {
        key: "arg",
        message: "Define a variable to pass with the docker build command at build time (optional, e.g., \"VERSION\"):",
        default: None,
        rule: Rule::Grammar(FieldKind::Identifier),
    },
    Field {
        key: "entrypoint",
        message: "Enter the main command that will be executed when the container is launched (optional, shell form, e.g., \"executable param1 param2\"):",
        default: None,
        rule: Rule::Grammar(FieldKind::ShellCommand),
    },
    Field {
        key: "healthcheck",
        message: "Enter the health check options (optional, e.g., \"--timeout=30s --retries=3\", or NONE):",
        default: None,
        rule: Rule::Grammar(FieldKind::HealthcheckSpec),
    },
    Field {
        key: "healthcheck_cmd",
        message: "Enter the health check command (optional, shell form, e.g., \"executable param1 param2\"):",
        default: None,
        rule: Rule::Grammar(FieldKind::ShellCommand),
    },
    Field {
        key: "label",
        message: "Add any labels to the image (optional, format: <key>=<value> <key>=<value> ...):",
        default: None,
        rule: Rule::Grammar(FieldKind::KeyValueList),
    },
    Field {
        key: "onbuild",
        message: "Enter the instruction to be executed when the image is used as the base for another build (optional, format: <INSTRUCTION> <arguments>):",
        default: None,
        rule: Rule::Grammar(FieldKind::InstructionLine),
    },
    Field {
        key: "stopsignal",
        message: "Enter the signal that will be sent to the container to exit (optional, e.g., SIGKILL):",
        default: None,
        rule: Rule::Grammar(FieldKind::Signal),
    },
    Field {
        key: "user",
        message: "Set the user and group (optional, format: <user>[:<group>]):",
        default: None,
        rule: Rule::Grammar(FieldKind::UserGroup),
    },
    Field {
        key: "volume",
        message: "Enter the volume's mount point (optional, format: [\"/data\"]):",
        default: None,
        rule: Rule::Grammar(FieldKind::VolumePath),
    },
];

impl Answers {
    pub fn from_toml(input: &str) -> Result<Self, Error> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let input = std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        Self::from_toml(&input)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "base_image" => &self.base_image,
            "copy_source" => &self.copy_source,
            "copy_destination" => &self.copy_destination,
            "expose_ports" => &self.expose_ports,
            "environment" => &self.environment,
            "cmd" => &self.cmd,
            "arg" => &self.arg,
            "entrypoint" => &self.entrypoint,
            "healthcheck" => &self.healthcheck,
            "healthcheck_cmd" => &self.healthcheck_cmd,
            "label" => &self.label,
            "onbuild" => &self.onbuild,
            "stopsignal" => &self.stopsignal,
            "user" => &self.user,
            "volume" => &self.volume,
            _ => return None,
        };
        Some(value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut String> {
        let value = match key {
            "base_image" => &mut self.base_image,
            "copy_source" => &mut self.copy_source,
            "copy_destination" => &mut self.copy_destination,
            "expose_ports" => &mut self.expose_ports,
            "environment" => &mut self.environment,
            "cmd" => &mut self.cmd,
            "arg" => &mut self.arg,
            "entrypoint" => &mut self.entrypoint,
            "healthcheck" => &mut self.healthcheck,
            "healthcheck_cmd" => &mut self.healthcheck_cmd,
            "label" => &mut self.label,
            "onbuild" => &mut self.onbuild,
            "stopsignal" => &mut self.stopsignal,
            "user" => &mut self.user,
            "volume" => &mut self.volume,
            _ => return None,
        };
        Some(value)
    }

    /// Checks every answer and returns all rejections, in prompt order.
    ///
    /// `Err` only for an environment failure while checking a path.
    pub fn validate(&self, probe: &dyn PathProbe) -> Result<Vec<FieldError>, Error> {
        let mut errors = Vec::new();
        for field in &FIELDS {
            let value = self.get(field.key).unwrap_or_default();
            if let Validation::Invalid(reason) = field.check(value, probe)? {
                errors.push(FieldError {
                    key: field.key,
                    reason,
                });
            }
        }

        if !self.healthcheck_cmd.trim().is_empty() {
            let reason = match parse_healthcheck(&self.healthcheck) {
                Ok(Healthcheck::Disabled) => Some(HEALTHCHECK_NONE_WITH_CMD),
                Ok(parsed) if parsed.command().is_some() => Some(HEALTHCHECK_CMD_TWICE),
                _ => None,
            };
            if let Some(reason) = reason {
                errors.push(FieldError {
                    key: "healthcheck_cmd",
                    reason: reason.to_string(),
                });
            }
        }

        Ok(errors)
    }
}

pub fn validate_image_reference(raw: &str) -> Validation {
    let image = raw.trim();
    if image.is_empty() {
        Validation::invalid(BASE_IMAGE_REQUIRED)
    } else if image.contains(char::is_whitespace) {
        Validation::invalid(BASE_IMAGE_SINGLE)
    } else {
        Validation::Valid
    }
}
