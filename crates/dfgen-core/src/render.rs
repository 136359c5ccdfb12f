use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

use crate::answers::Answers;
use crate::healthcheck::{Healthcheck, parse_healthcheck};

/// A template line is dropped when any of its placeholders is empty.
const TEMPLATE: &str = "\
FROM {base_image}

ARG {arg}

COPY {copy_source} {copy_destination}

ENV {environment}

LABEL {label}

EXPOSE {expose_ports}

USER {user}

VOLUME {volume}

{healthcheck_instruction}

ONBUILD {onbuild}

STOPSIGNAL {stopsignal}

ENTRYPOINT {entrypoint}

CMD {cmd}
";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"));

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("blank run pattern is valid"));

/// Renders answers that already passed validation.
pub fn render(answers: &Answers) -> String {
    let healthcheck = healthcheck_instruction(answers);
    let mut out = String::with_capacity(TEMPLATE.len());

    for line in TEMPLATE.lines() {
        let mut has_empty_slot = false;
        let rendered = PLACEHOLDER_RE.replace_all(line, |caps: &Captures<'_>| {
            let value = match &caps[1] {
                "healthcheck_instruction" => healthcheck.as_str(),
                key => answers.get(key).unwrap_or_default().trim(),
            };
            has_empty_slot |= value.is_empty();
            value.to_string()
        });

        if !has_empty_slot {
            out.push_str(&rendered);
        }
        out.push('\n');
    }

    let mut collapsed = collapse_blank_lines(out.trim_start_matches('\n'));
    collapsed.truncate(collapsed.trim_end_matches('\n').len());
    collapsed.push('\n');
    collapsed
}

/// Replaces every run of two or more newlines with exactly two.
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN_RE.replace_all(text, "\n\n").into_owned()
}

fn healthcheck_instruction(answers: &Answers) -> String {
    let options = answers.healthcheck.trim();
    let command = answers.healthcheck_cmd.trim();
    if options.is_empty() && command.is_empty() {
        return String::new();
    }

    let parsed = match parse_healthcheck(options) {
        Ok(parsed) => parsed,
        Err(reason) => {
            warn!(%reason, "skipping HEALTHCHECK that does not parse");
            return String::new();
        }
    };

    match &parsed {
        Healthcheck::Disabled => "HEALTHCHECK NONE".to_string(),
        Healthcheck::Check { command: Some(_), .. } => format!("HEALTHCHECK {parsed}"),
        Healthcheck::Check { command: None, .. } if !command.is_empty() => {
            if options.is_empty() {
                format!("HEALTHCHECK CMD {command}")
            } else {
                format!("HEALTHCHECK {parsed} CMD {command}")
            }
        }
        Healthcheck::Check { .. } => {
            warn!(options, "skipping HEALTHCHECK options without a command");
            String::new()
        }
    }
}
