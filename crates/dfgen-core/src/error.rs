use std::path::PathBuf;

use thiserror::Error;

use crate::answers::FieldError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot inspect path {}: {source}", .path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("answers parse error: {0}")]
    AnswersParse(#[from] toml::de::Error),
    #[error("generated dockerfile does not parse: {msg}")]
    DockerfileParse { msg: String },
    #[error("unknown field kind '{name}'. Must be one of: {expected}")]
    UnknownFieldKind { name: String, expected: String },
    #[error("input closed before '{field}' was answered")]
    PromptClosed { field: String },
    #[error("{}", render_field_errors(.0))]
    InvalidAnswers(Vec<FieldError>),
    #[error("{} already exists; pass --force to overwrite", .path.display())]
    OutputExists { path: PathBuf },
}

impl Error {
    pub fn probe(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Probe {
            path: path.into(),
            source,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn dockerfile_parse(msg: impl Into<String>) -> Self {
        Self::DockerfileParse { msg: msg.into() }
    }

    pub fn prompt_closed(field: impl Into<String>) -> Self {
        Self::PromptClosed {
            field: field.into(),
        }
    }
}

fn render_field_errors(errors: &[FieldError]) -> String {
    let mut out = format!("{} invalid answer(s):", errors.len());
    for error in errors {
        out.push_str(&format!("\n  {}: {}", error.key, error.reason));
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::answers::FieldError;
    use crate::error::Error;

    #[test]
    fn invalid_answers_lists_every_field() {
        let error = Error::InvalidAnswers(vec![
            FieldError {
                key: "expose_ports",
                reason: "bad ports".to_string(),
            },
            FieldError {
                key: "user",
                reason: "bad user".to_string(),
            },
        ]);

        assert_eq!(
            error.to_string(),
            "2 invalid answer(s):\n  expose_ports: bad ports\n  user: bad user"
        );
    }

    #[test]
    fn probe_error_keeps_io_source() {
        let error = Error::probe(
            "/srv/app",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        let source = std::error::Error::source(&error).expect("probe error should carry a source");
        assert!(source.to_string().contains("denied"));
        assert!(error.to_string().starts_with("cannot inspect path /srv/app"));
    }
}
