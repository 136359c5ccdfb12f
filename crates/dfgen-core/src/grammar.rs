//! Per-field grammars.
//!
//! Every validator treats blank input as valid: each answer is optional
//! unless the caller says otherwise. Messages are shown to end users as-is,
//! so changing one is a user-visible change.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::healthcheck::parse_healthcheck;
use crate::validation::{PathKind, PathProbe, Validation};

pub const SINGLE_LINE: &str = "Value must be a single line.";
pub const DIRECTORY_MISSING: &str =
    "Directory does not exist. Please provide a valid directory path.";
pub const NOT_A_DIRECTORY: &str =
    "Provided path is not a directory. Please provide a valid directory path.";
pub const INVALID_DIRECTORY_FORMAT: &str =
    "Please enter a valid unix directory (e.g. /app, ~/app or ./app).";
pub const KEY_VALUE_COMMA: &str =
    "Invalid format. Please enter space separated key-value pairs.";
pub const KEY_VALUE_MISSING: &str = "Key and value must be present (format: <KEY>=<VALUE>).";
pub const INVALID_IDENTIFIER: &str = "Invalid ARG format. Use a name made of letters, digits and '_' that does not start with a digit.";
pub const INVALID_BUILD_ARG: &str =
    "Invalid build argument format. Please use the format: <name>[=<default>]";
pub const INVALID_USER_GROUP: &str = "Invalid user format. Please use <user>[:<group>] with lower-case names of at most 31 characters.";
pub const INVALID_VOLUME: &str =
    "Invalid volume format. Please use a JSON array holding one absolute path, e.g. [\"/data\"].";

/// Signals accepted for STOPSIGNAL.
pub const SIGNALS: [&str; 7] = [
    "SIGINT", "SIGALRM", "SIGABRT", "SIGSTOP", "SIGCONT", "SIGSEGV", "SIGKILL",
];

// Absolute, home-relative or dot-relative; segments may contain `\ `.
static DIRECTORY_FORMAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:/(?:[A-Za-z0-9_.-]+(?:\\ |/)?)*|~(?:/(?:[A-Za-z0-9_.-]+(?:\\ |/)?)*)?|\.(?:/(?:[A-Za-z0-9_.-]+(?:\\ |/)?)*)?)*$",
    )
    .expect("directory format pattern is valid")
});

static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

static BUILD_ARG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:=[A-Za-z0-9_./:]*)?$")
        .expect("build arg pattern is valid")
});

static USER_GROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9_][a-z0-9_-]{0,30}(?::[a-z0-9_][a-z0-9_-]{0,30})?$")
        .expect("user pattern is valid")
});

static VOLUME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[\s*"/(?:(?:[^"'/\\]|\\.)+/?)*"\s*\]$"#).expect("volume pattern is valid")
});

pub fn validate_directory_path(raw: &str, probe: &dyn PathProbe) -> Result<Validation, Error> {
    let path = raw.trim();
    if path.is_empty() {
        return Ok(Validation::Valid);
    }
    if !is_single_line(path) {
        return Ok(Validation::invalid(SINGLE_LINE));
    }

    match probe.probe(Path::new(path)) {
        Ok(Some(PathKind::Directory)) => Ok(Validation::Valid),
        Ok(Some(PathKind::Other)) => Ok(Validation::invalid(NOT_A_DIRECTORY)),
        Ok(None) => Ok(Validation::invalid(DIRECTORY_MISSING)),
        Err(source) => Err(Error::probe(path, source)),
    }
}

pub fn validate_directory_format(raw: &str) -> Validation {
    check_pattern(raw, &DIRECTORY_FORMAT_RE, INVALID_DIRECTORY_FORMAT)
}

pub fn validate_port_list(raw: &str) -> Validation {
    let ports = raw.trim();
    if !is_single_line(ports) {
        return Validation::invalid(SINGLE_LINE);
    }

    let rejected = space_separated(ports)
        .filter(|token| parse_port(token).is_none())
        .collect::<Vec<_>>();

    if rejected.is_empty() {
        return Validation::Valid;
    }

    Validation::invalid(format!(
        "Invalid port numbers: {}. Please enter space separated integers between 0 and 65535.",
        rejected.join(" ")
    ))
}

fn parse_port(token: &str) -> Option<u16> {
    if !token.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

pub fn validate_key_value_list(raw: &str) -> Validation {
    let pairs = raw.trim();
    if !is_single_line(pairs) {
        return Validation::invalid(SINGLE_LINE);
    }

    for pair in space_separated(pairs) {
        if pair.contains(|c: char| c == ',' || c.is_whitespace()) {
            return Validation::invalid(KEY_VALUE_COMMA);
        }

        let Some((key, value)) = pair.split_once('=') else {
            return Validation::invalid(KEY_VALUE_MISSING);
        };
        if key.is_empty() || value.is_empty() {
            return Validation::invalid(KEY_VALUE_MISSING);
        }

        if !key.chars().all(is_key_char) {
            return Validation::invalid(format!(
                "Invalid key '{key}'. Keys may only contain letters, digits, '_' and '.'."
            ));
        }
    }

    Validation::Valid
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.')
}

/// Tokens separated by one or more plain spaces. Tabs stay inside tokens.
fn space_separated(value: &str) -> impl Iterator<Item = &str> {
    value.split(' ').filter(|token| !token.is_empty())
}

/// `\r` and `\n` would let one answer render as several Dockerfile lines.
pub(crate) fn is_single_line(value: &str) -> bool {
    !value.contains(['\r', '\n'])
}

/// Shell-form commands are limited to plain words. Quoting, pipes,
/// redirection and command separators are all rejected.
pub fn validate_shell_command(raw: &str) -> Validation {
    let command = raw.trim();
    if !is_single_line(command) {
        return Validation::invalid(SINGLE_LINE);
    }
    match command.chars().find(|c| *c != ' ' && !is_command_char(*c)) {
        None => Validation::Valid,
        Some(c) => Validation::invalid(format!(
            "Invalid command format: {c:?} is not allowed. Please use space separated words made of letters, digits and _ / . ~ -"
        )),
    }
}

fn is_command_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '.' | '~' | '-')
}

pub fn validate_identifier(raw: &str) -> Validation {
    check_pattern(raw, &IDENTIFIER_RE, INVALID_IDENTIFIER)
}

pub fn validate_build_arg(raw: &str) -> Validation {
    check_pattern(raw, &BUILD_ARG_RE, INVALID_BUILD_ARG)
}

pub fn validate_healthcheck(raw: &str) -> Validation {
    if raw.trim().is_empty() {
        return Validation::Valid;
    }
    parse_healthcheck(raw).map(|_| ()).into()
}

pub fn validate_signal(raw: &str) -> Validation {
    let signal = raw.trim();
    if signal.is_empty() || SIGNALS.contains(&signal) {
        return Validation::Valid;
    }
    if !is_single_line(signal) {
        return Validation::invalid(SINGLE_LINE);
    }

    Validation::invalid(format!(
        "Invalid stop signal '{signal}'. Must be one of: {}",
        SIGNALS.join(", ")
    ))
}

pub fn validate_user_group(raw: &str) -> Validation {
    check_pattern(raw, &USER_GROUP_RE, INVALID_USER_GROUP)
}

pub fn validate_volume_path(raw: &str) -> Validation {
    check_pattern(raw, &VOLUME_RE, INVALID_VOLUME)
}

fn check_pattern(raw: &str, pattern: &Regex, reason: &str) -> Validation {
    let value = raw.trim();
    if value.is_empty() {
        Validation::Valid
    } else if !is_single_line(value) {
        Validation::invalid(SINGLE_LINE)
    } else if pattern.is_match(value) {
        Validation::Valid
    } else {
        Validation::invalid(reason)
    }
}
