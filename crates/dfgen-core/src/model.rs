/// One instruction of a generated Dockerfile, as the parser saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSpan {
    pub keyword: String,
    pub raw: String,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDockerfile {
    pub content: String,
    pub instructions: Vec<InstructionSpan>,
}

impl GeneratedDockerfile {
    pub fn keywords(&self) -> Vec<&str> {
        self.instructions
            .iter()
            .map(|instruction| instruction.keyword.as_str())
            .collect()
    }
}
