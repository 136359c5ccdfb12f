use core::fmt;

use crate::grammar::{SINGLE_LINE, is_single_line};

const FORMAT_HINT: &str = "Expected [--interval=<duration>] [--timeout=<duration>] [--start-period=<duration>] [--start-interval=<duration>] [--retries=<n>] [CMD <command>], or NONE.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Healthcheck {
    /// `NONE`: disables any check inherited from the base image.
    Disabled,
    Check {
        options: Vec<HealthcheckOption>,
        command: Option<HealthcheckCommand>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthcheckOption {
    pub flag: HealthcheckFlag,
    pub value: String,
}

/// Options in the only order the grammar accepts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthcheckFlag {
    Interval,
    Timeout,
    StartPeriod,
    StartInterval,
    Retries,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthcheckCommand {
    Shell(String),
    Exec(Vec<String>),
}

impl HealthcheckFlag {
    pub const ALL: [Self; 5] = [
        Self::Interval,
        Self::Timeout,
        Self::StartPeriod,
        Self::StartInterval,
        Self::Retries,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interval => "interval",
            Self::Timeout => "timeout",
            Self::StartPeriod => "start-period",
            Self::StartInterval => "start-interval",
            Self::Retries => "retries",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.as_str() == name)
    }
}

impl Healthcheck {
    pub fn options(&self) -> &[HealthcheckOption] {
        match self {
            Self::Disabled => &[],
            Self::Check { options, .. } => options,
        }
    }

    pub fn command(&self) -> Option<&HealthcheckCommand> {
        match self {
            Self::Disabled => None,
            Self::Check { command, .. } => command.as_ref(),
        }
    }
}

impl fmt::Display for Healthcheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (options, command) = match self {
            Self::Disabled => return f.write_str("NONE"),
            Self::Check { options, command } => (options, command),
        };

        let mut first = true;
        for option in options {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "--{}={}", option.flag.as_str(), option.value)?;
            first = false;
        }

        if let Some(command) = command {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "CMD {command}")?;
        }
        Ok(())
    }
}

impl fmt::Display for HealthcheckCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shell(command) => f.write_str(command),
            Self::Exec(args) => {
                let encoded = serde_json::to_string(args).map_err(|_| fmt::Error)?;
                f.write_str(&encoded)
            }
        }
    }
}

/// Parses HEALTHCHECK arguments. The error is a user-facing reason.
pub fn parse_healthcheck(input: &str) -> Result<Healthcheck, String> {
    if !is_single_line(input.trim()) {
        return Err(SINGLE_LINE.to_string());
    }
    Parser::new(input).parse()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse(&mut self) -> Result<Healthcheck, String> {
        self.skip_ws();
        if self.rest().trim_end() == "NONE" {
            return Ok(Healthcheck::Disabled);
        }

        let mut options: Vec<HealthcheckOption> = Vec::new();
        loop {
            self.skip_ws();
            if self.is_eof() {
                break;
            }

            if self.rest().starts_with("--") {
                let option = self.parse_option()?;
                if let Some(previous) = options.last() {
                    check_order(previous.flag, option.flag)?;
                }
                options.push(option);
                continue;
            }

            let word = self.parse_word();
            return match word {
                "CMD" => {
                    let command = self.parse_command()?;
                    Ok(Healthcheck::Check {
                        options,
                        command: Some(command),
                    })
                }
                "NONE" => Err(error("NONE cannot be combined with options.")),
                _ => Err(error(format!("unexpected '{word}'. {FORMAT_HINT}"))),
            };
        }

        Ok(Healthcheck::Check {
            options,
            command: None,
        })
    }

    fn parse_option(&mut self) -> Result<HealthcheckOption, String> {
        let word = self.parse_word();
        let body = &word[2..];
        let Some((name, value)) = body.split_once('=') else {
            return Err(error(format!("option '{word}' needs a value. {FORMAT_HINT}")));
        };

        let Some(flag) = HealthcheckFlag::from_name(name) else {
            return Err(error(format!("unknown option '--{name}'. {FORMAT_HINT}")));
        };

        let value_ok = match flag {
            HealthcheckFlag::Retries => is_count(value),
            _ => is_duration(value),
        };
        if !value_ok {
            let expected = match flag {
                HealthcheckFlag::Retries => "a non-negative integer",
                _ => "a duration such as 30s, 5m or 1m30s",
            };
            return Err(error(format!(
                "--{} must be {expected}, got '{value}'.",
                flag.as_str()
            )));
        }

        Ok(HealthcheckOption {
            flag,
            value: value.to_string(),
        })
    }

    fn parse_command(&mut self) -> Result<HealthcheckCommand, String> {
        self.skip_ws();
        let command = self.rest().trim_end();
        self.pos = self.input.len();

        if command.is_empty() {
            return Err(error("CMD needs a command, e.g. CMD curl -f http://localhost/"));
        }

        if !command.starts_with('[') {
            return Ok(HealthcheckCommand::Shell(command.to_string()));
        }

        match serde_json::from_str::<Vec<String>>(command) {
            Ok(args) if !args.is_empty() => Ok(HealthcheckCommand::Exec(args)),
            _ => Err(error(
                "exec form CMD must be a non-empty JSON array of strings, e.g. CMD [\"curl\", \"-f\", \"http://localhost/\"]",
            )),
        }
    }

    fn parse_word(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(byte) = self.peek_byte() {
            if byte.is_ascii_whitespace() {
                break;
            }
            self.bump_byte();
        }
        &self.input[start..self.pos]
    }

    fn skip_ws(&mut self) {
        while let Some(byte) = self.peek_byte() {
            if byte.is_ascii_whitespace() {
                self.bump_byte();
            } else {
                break;
            }
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn bump_byte(&mut self) {
        self.pos += 1;
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }
}

fn check_order(previous: HealthcheckFlag, next: HealthcheckFlag) -> Result<(), String> {
    if next == previous {
        return Err(error(format!(
            "--{} is given more than once.",
            next.as_str()
        )));
    }
    if next < previous {
        return Err(error(format!(
            "--{} must come before --{}. {FORMAT_HINT}",
            next.as_str(),
            previous.as_str()
        )));
    }
    Ok(())
}

fn error(detail: impl fmt::Display) -> String {
    format!("Invalid HEALTHCHECK format: {detail}")
}

fn is_count(value: &str) -> bool {
    !value.is_empty()
        && value.bytes().all(|byte| byte.is_ascii_digit())
        && value.parse::<u32>().is_ok()
}

/// Go-style durations: one or more `<number><unit>` pairs, unit required.
fn is_duration(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }

    let mut rest = value;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_len];
        if number.is_empty() || number == "." || number.matches('.').count() > 1 {
            return false;
        }
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        if !matches!(&rest[..unit_len], "ns" | "us" | "µs" | "ms" | "s" | "m" | "h") {
            return false;
        }
        rest = &rest[unit_len..];
    }
    true
}

#[cfg(test)]
mod tests {
    use crate::healthcheck::{
        Healthcheck, HealthcheckCommand, HealthcheckFlag, HealthcheckOption, is_duration,
        parse_healthcheck,
    };

    fn option(flag: HealthcheckFlag, value: &str) -> HealthcheckOption {
        HealthcheckOption {
            flag,
            value: value.to_string(),
        }
    }

    #[test]
    fn parses_none() {
        assert_eq!(
            parse_healthcheck("NONE").expect("NONE should parse"),
            Healthcheck::Disabled
        );
        assert_eq!(
            parse_healthcheck("  NONE ").expect("NONE should parse"),
            Healthcheck::Disabled
        );
    }

    #[test]
    fn parses_options_only() {
        let parsed = parse_healthcheck("--interval=5m --timeout=3s").expect("options should parse");
        assert_eq!(
            parsed,
            Healthcheck::Check {
                options: vec![
                    option(HealthcheckFlag::Interval, "5m"),
                    option(HealthcheckFlag::Timeout, "3s"),
                ],
                command: None,
            }
        );
    }

    #[test]
    fn parses_shell_command_with_operators() {
        let parsed = parse_healthcheck("CMD curl -f http://localhost/ || exit 1")
            .expect("shell command should parse");
        assert_eq!(
            parsed.command(),
            Some(&HealthcheckCommand::Shell(
                "curl -f http://localhost/ || exit 1".to_string()
            ))
        );
        assert!(parsed.options().is_empty());
    }

    #[test]
    fn parses_every_option_then_exec_command() {
        let parsed = parse_healthcheck(
            r#"--interval=30s --timeout=1m30s --start-period=5s --start-interval=500ms --retries=3 CMD ["curl", "-f", "http://localhost/"]"#,
        )
        .expect("full healthcheck should parse");

        assert_eq!(parsed.options().len(), 5);
        assert_eq!(
            parsed.command(),
            Some(&HealthcheckCommand::Exec(vec![
                "curl".to_string(),
                "-f".to_string(),
                "http://localhost/".to_string(),
            ]))
        );
        assert_eq!(
            parsed.to_string(),
            r#"--interval=30s --timeout=1m30s --start-period=5s --start-interval=500ms --retries=3 CMD ["curl","-f","http://localhost/"]"#
        );
    }

    #[test]
    fn rejects_out_of_order_and_repeated_options() {
        let reason = parse_healthcheck("--timeout=3s --interval=5m").expect_err("order is fixed");
        assert!(reason.contains("--interval must come before --timeout"));

        let reason =
            parse_healthcheck("--retries=3 --retries=4").expect_err("repeats are rejected");
        assert!(reason.contains("--retries is given more than once"));
    }

    #[test]
    fn rejects_bad_values() {
        let reason = parse_healthcheck("--interval=30").expect_err("unit is required");
        assert!(reason.contains("--interval must be a duration"));

        let reason = parse_healthcheck("--retries=-1").expect_err("retries are unsigned");
        assert!(reason.contains("--retries must be a non-negative integer"));

        assert!(parse_healthcheck("--retries=99999999999").is_err());
        assert!(parse_healthcheck("--interval").is_err());
        assert!(parse_healthcheck("--every=5s").is_err());
    }

    #[test]
    fn rejects_free_text_and_bare_commands() {
        let reason = parse_healthcheck("INVALID FORMAT").expect_err("free text is rejected");
        assert!(reason.starts_with("Invalid HEALTHCHECK format: unexpected 'INVALID'"));

        assert!(parse_healthcheck(r#"["curl", "-f", "http://localhost/"]"#).is_err());
        assert!(parse_healthcheck("--interval=5m NONE").is_err());
        assert!(parse_healthcheck("CMD").is_err());
        assert!(parse_healthcheck("CMD   ").is_err());
        assert!(parse_healthcheck("CMD []").is_err());
        assert!(parse_healthcheck(r#"CMD ["curl", 1]"#).is_err());
    }

    #[test]
    fn command_clause_stays_on_one_line() {
        assert_eq!(
            parse_healthcheck("CMD true\nRUN a;b|c"),
            Err("Value must be a single line.".to_string())
        );
        assert!(parse_healthcheck("--interval=5m\r\nCMD true").is_err());
        assert!(parse_healthcheck("NONE\n").is_ok());
    }

    #[test]
    fn duration_grammar() {
        for value in ["5m", "3s", "1m30s", "1.5s", "500ms", "2h", "10us", "1h0m0s"] {
            assert!(is_duration(value), "expected '{value}' to be a duration");
        }
        for value in ["", "30", "smh", "5x", "1..5s", ".s", "5 m"] {
            assert!(!is_duration(value), "expected '{value}' to be rejected");
        }
    }
}
