use std::io::{BufRead, Write};

use crate::answers::{Answers, FIELDS, Field};
use crate::error::Error;
use crate::validation::{PathProbe, Validation};

/// Asks every question in [`FIELDS`] and returns the accepted answers.
///
/// An empty reply takes the field's default. A rejected reply prints the
/// reason and asks the same question again.
pub fn prompt_answers<R, W>(
    mut input: R,
    mut output: W,
    probe: &dyn PathProbe,
) -> Result<Answers, Error>
where
    R: BufRead,
    W: Write,
{
    let mut answers = Answers::default();
    for field in &FIELDS {
        let value = ask(&mut input, &mut output, field, probe)?;
        if let Some(slot) = answers.get_mut(field.key) {
            *slot = value;
        }
    }
    Ok(answers)
}

fn ask<R, W>(input: &mut R, output: &mut W, field: &Field, probe: &dyn PathProbe) -> Result<String, Error>
where
    R: BufRead,
    W: Write,
{
    loop {
        match field.default {
            Some(default) => write!(output, "? {} ({default}) ", field.message),
            None => write!(output, "? {} ", field.message),
        }
        .and_then(|()| output.flush())
        .map_err(|source| Error::io("<output>", source))?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|source| Error::io("<input>", source))?;
        if read == 0 {
            return Err(Error::prompt_closed(field.key));
        }

        let reply = line.trim_end_matches(['\r', '\n']);
        let value = match field.default {
            Some(default) if reply.trim().is_empty() => default,
            _ => reply,
        };

        match field.check(value, probe)? {
            Validation::Valid => return Ok(value.trim().to_string()),
            Validation::Invalid(reason) => writeln!(output, ">> {reason}")
                .map_err(|source| Error::io("<output>", source))?,
        }
    }
}
