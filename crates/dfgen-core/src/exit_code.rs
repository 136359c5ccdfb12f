use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Invalid = 1,
    AnswersParse = 2,
    DockerfileParse = 3,
    OutputExists = 4,
    Io = 6,
    Usage = 64,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(value: &Error) -> Self {
        match value {
            Error::InvalidAnswers(_) => Self::Invalid,
            Error::AnswersParse(_) => Self::AnswersParse,
            Error::DockerfileParse { .. } => Self::DockerfileParse,
            Error::OutputExists { .. } => Self::OutputExists,
            Error::Probe { .. } | Error::Io { .. } | Error::PromptClosed { .. } => Self::Io,
            Error::UnknownFieldKind { .. } => Self::Usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::exit_code::ExitCode;

    #[test]
    fn maps_error_variants_to_exit_codes() {
        assert_eq!(
            ExitCode::from(&Error::InvalidAnswers(Vec::new())),
            ExitCode::Invalid
        );
        assert_eq!(
            ExitCode::from(&Error::dockerfile_parse("bad dockerfile")),
            ExitCode::DockerfileParse
        );
        assert_eq!(
            ExitCode::from(&Error::OutputExists {
                path: "Dockerfile".into()
            }),
            ExitCode::OutputExists
        );
        assert_eq!(
            ExitCode::from(&Error::probe(
                "/srv",
                std::io::Error::from(std::io::ErrorKind::PermissionDenied)
            )),
            ExitCode::Io
        );
        assert_eq!(
            ExitCode::from(&Error::prompt_closed("user")),
            ExitCode::Io
        );
        assert_eq!(
            ExitCode::from(&Error::UnknownFieldKind {
                name: "nope".to_string(),
                expected: String::new(),
            }),
            ExitCode::Usage
        );
    }

    #[test]
    fn answers_parse_errors_have_their_own_code() {
        let parse_error =
            toml::from_str::<toml::Value>("user = ").expect_err("toml should fail to parse");
        assert_eq!(
            ExitCode::from(&Error::AnswersParse(parse_error)),
            ExitCode::AnswersParse
        );
    }
}
