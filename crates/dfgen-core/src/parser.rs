use dockerfile_parser::{Dockerfile, Instruction as ParsedInstruction};

use crate::error::Error;
use crate::model::InstructionSpan;

/// Re-parses generated output so a rendering mistake fails generation
/// instead of producing a Dockerfile that `docker build` rejects.
pub fn parse_rendered(input: &str) -> Result<Vec<InstructionSpan>, Error> {
    let dockerfile =
        Dockerfile::parse(input).map_err(|err| Error::dockerfile_parse(format!("{err}")))?;

    if !dockerfile
        .instructions
        .iter()
        .any(|instruction| instruction.as_from().is_some())
    {
        return Err(Error::dockerfile_parse("no FROM instruction"));
    }

    let line_index = LineIndex::new(&dockerfile.content);
    dockerfile
        .instructions
        .iter()
        .map(|instruction| map_instruction(instruction, &dockerfile.content, &line_index))
        .collect()
}

fn map_instruction(
    instruction: &ParsedInstruction,
    content: &str,
    line_index: &LineIndex,
) -> Result<InstructionSpan, Error> {
    let span = instruction.span();
    let raw = span_slice(content, span.start, span.end)?;

    let keyword = match instruction {
        ParsedInstruction::From(_) => "FROM".to_string(),
        ParsedInstruction::Arg(_) => "ARG".to_string(),
        ParsedInstruction::Label(_) => "LABEL".to_string(),
        ParsedInstruction::Run(_) => "RUN".to_string(),
        ParsedInstruction::Entrypoint(_) => "ENTRYPOINT".to_string(),
        ParsedInstruction::Cmd(_) => "CMD".to_string(),
        ParsedInstruction::Copy(_) => "COPY".to_string(),
        ParsedInstruction::Env(_) => "ENV".to_string(),
        ParsedInstruction::Misc(misc) => misc.instruction.content.to_ascii_uppercase(),
    };

    let start_line = line_index.line_for_offset(span.start);
    let end_line = if span.end > span.start {
        line_index.line_for_offset(span.end - 1)
    } else {
        start_line
    };

    Ok(InstructionSpan {
        keyword,
        raw,
        start_line,
        end_line,
    })
}

fn span_slice(content: &str, start: usize, end: usize) -> Result<String, Error> {
    content
        .get(start..end)
        .map(str::to_string)
        .ok_or_else(|| Error::dockerfile_parse(format!("invalid instruction span {start}..{end}")))
}

struct LineIndex {
    newline_offsets: Vec<usize>,
}

impl LineIndex {
    fn new(content: &str) -> Self {
        let newline_offsets = content
            .match_indices('\n')
            .map(|(index, _)| index)
            .collect();
        Self { newline_offsets }
    }

    fn line_for_offset(&self, offset: usize) -> usize {
        self.newline_offsets
            .partition_point(|value| *value < offset)
            + 1
    }
}
