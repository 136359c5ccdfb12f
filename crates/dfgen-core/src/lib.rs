pub mod answers;
pub mod error;
pub mod exit_code;
pub mod generate;
pub mod grammar;
pub mod healthcheck;
pub mod instruction;
pub mod model;
pub mod parser;
pub mod prompt;
pub mod render;
pub mod validation;

pub use crate::answers::{Answers, FIELDS, Field, FieldError, Rule};
pub use crate::error::Error;
pub use crate::exit_code::ExitCode;
pub use crate::generate::{generate, write_dockerfile};
pub use crate::grammar::{
    validate_build_arg, validate_directory_format, validate_directory_path, validate_healthcheck,
    validate_identifier, validate_key_value_list, validate_port_list, validate_shell_command,
    validate_signal, validate_user_group, validate_volume_path,
};
pub use crate::healthcheck::{Healthcheck, parse_healthcheck};
pub use crate::instruction::{Instruction, validate_instruction_line};
pub use crate::model::{GeneratedDockerfile, InstructionSpan};
pub use crate::validation::{FieldKind, FsProbe, PathKind, PathProbe, Validation};
