use std::io::Write;
use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum, error::ErrorKind};
use clap_complete::{
    generate,
    shells::{Bash, Fish, Zsh},
};
use serde::Serialize;
use tracing::{Level, debug, info};

use dfgen_core::answers::{Answers, FIELDS};
use dfgen_core::exit_code::ExitCode;
use dfgen_core::prompt::prompt_answers;
use dfgen_core::validation::{FieldKind, FsProbe, Validation};
use dfgen_core::{Error, write_dockerfile};

const LONG_ABOUT: &str = "Generate a Dockerfile from validated answers.\n\nEvery answer is checked before it is rendered: ports, key=value lists, shell-form commands, user:group, volumes, stop signals, health checks and ONBUILD trigger instructions are rejected early with a reason instead of ending up in a broken Dockerfile.";

const AFTER_HELP: &str = "Examples:\n  dfgen check port-list '8080 3000'\n  dfgen check instruction-line 'USER root:admin'\n  dfgen check --json healthcheck '--interval=5m --timeout=3s'\n  dfgen generate --interactive\n  dfgen generate --answers answers.toml --stdout\n  dfgen generate --answers answers.toml -o build/Dockerfile --force\n  dfgen fields";

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(app_error) => {
            if !app_error.message.is_empty() {
                eprintln!("{}", app_error.message);
            }
            app_error.code
        }
    };
    std::process::exit(code.as_i32());
}

#[derive(Debug)]
struct AppError {
    code: ExitCode,
    message: String,
}

impl AppError {
    fn usage(message: impl Into<String>) -> Self {
        Self {
            code: ExitCode::Usage,
            message: message.into(),
        }
    }
}

impl From<Error> for AppError {
    fn from(value: Error) -> Self {
        Self {
            code: ExitCode::from(&value),
            message: value.to_string(),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Validate a single answer")]
    Check {
        #[arg(
            value_name = "KIND",
            value_parser = PossibleValuesParser::new(FieldKind::ALL.map(FieldKind::as_str)),
            help = "Grammar to check the value against"
        )]
        kind: String,

        #[arg(
            value_name = "VALUE",
            allow_hyphen_values = true,
            help = "Value to check",
            long_help = "Value to check. Blank values are always valid because every answer is optional."
        )]
        value: String,

        #[arg(
            long = "json",
            help = "Emit a JSON report",
            long_help = "Emit { kind, value, valid, reason } on stdout instead of plain text."
        )]
        json: bool,
    },
    #[command(about = "Validate answers and write a Dockerfile")]
    Generate {
        #[arg(
            short = 'a',
            long = "answers",
            value_name = "PATH",
            conflicts_with = "interactive",
            help = "Read answers from a TOML file",
            long_help = "Read answers from a TOML file with one string per field (see `dfgen fields`). Missing keys take the prompt defaults."
        )]
        answers: Option<PathBuf>,

        #[arg(
            short = 'i',
            long = "interactive",
            help = "Ask for every answer",
            long_help = "Ask for every answer on the terminal. Questions go to stderr so --stdout output stays clean. A rejected answer is asked again."
        )]
        interactive: bool,

        #[arg(
            short = 'o',
            long = "output",
            value_name = "PATH",
            default_value = "Dockerfile",
            help = "Where to write the Dockerfile"
        )]
        output: PathBuf,

        #[arg(
            long = "stdout",
            conflicts_with = "output",
            help = "Print the Dockerfile instead of writing it"
        )]
        stdout: bool,

        #[arg(long = "force", help = "Overwrite an existing output file")]
        force: bool,
    },
    #[command(about = "List the answer fields, their grammar and defaults")]
    Fields,
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(value_enum, value_name = "SHELL")]
        shell: CompletionShell,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Debug, Parser)]
#[command(
    name = "dfgen",
    about = "Generate Dockerfiles from validated answers",
    long_about = LONG_ABOUT,
    after_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        help = "Print debug details to stderr",
        long_help = "Print debug logs to stderr while keeping stdout clean for result output."
    )]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    kind: &'a str,
    value: &'a str,
    valid: bool,
    reason: Option<&'a str>,
}

fn run() -> Result<ExitCode, AppError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) {
                print!("{err}");
                return Ok(ExitCode::Success);
            }
            return Err(AppError::usage(err.to_string()));
        }
    };

    init_tracing(cli.verbose);
    execute(cli.command)
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn execute(command: Commands) -> Result<ExitCode, AppError> {
    match command {
        Commands::Check { kind, value, json } => check(&kind, &value, json),
        Commands::Generate {
            answers,
            interactive,
            output,
            stdout,
            force,
        } => {
            let answers = collect_answers(answers, interactive)?;
            let target = (!stdout).then_some(output);
            generate_dockerfile(&answers, target, force)
        }
        Commands::Fields => write_fields(),
        Commands::Completion { shell } => write_completion(shell),
    }
}

fn check(kind: &str, value: &str, json: bool) -> Result<ExitCode, AppError> {
    let kind: FieldKind = kind.parse()?;
    let validation = kind.validate(value, &FsProbe)?;
    debug!(%kind, valid = validation.is_valid(), "checked value");

    let mut stdout = std::io::stdout().lock();
    if json {
        let report = CheckReport {
            kind: kind.as_str(),
            value,
            valid: validation.is_valid(),
            reason: validation.reason(),
        };
        let payload = serde_json::to_string(&report)
            .map_err(|err| AppError::usage(format!("cannot encode report: {err}")))?;
        writeln!(stdout, "{payload}").map_err(stdout_error)?;
    } else if validation.is_valid() {
        writeln!(stdout, "valid").map_err(stdout_error)?;
    }

    match validation {
        Validation::Valid => Ok(ExitCode::Success),
        Validation::Invalid(reason) => {
            if !json {
                eprintln!("{reason}");
            }
            Ok(ExitCode::Invalid)
        }
    }
}

fn collect_answers(path: Option<PathBuf>, interactive: bool) -> Result<Answers, AppError> {
    if interactive {
        let stdin = std::io::stdin().lock();
        let stderr = std::io::stderr().lock();
        return Ok(prompt_answers(stdin, stderr, &FsProbe)?);
    }

    match path {
        Some(path) => {
            debug!(path = %path.display(), "reading answers");
            Ok(Answers::from_file(&path)?)
        }
        None => Ok(Answers::default()),
    }
}

fn generate_dockerfile(
    answers: &Answers,
    target: Option<PathBuf>,
    force: bool,
) -> Result<ExitCode, AppError> {
    let generated = dfgen_core::generate(answers, &FsProbe)?;
    for instruction in &generated.instructions {
        debug!(
            keyword = %instruction.keyword,
            start_line = instruction.start_line,
            end_line = instruction.end_line,
            raw = %instruction.raw,
            "generated instruction"
        );
    }

    match target {
        Some(path) => {
            write_dockerfile(&path, &generated.content, force)?;
            info!(
                path = %path.display(),
                instructions = ?generated.keywords(),
                "wrote dockerfile"
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(generated.content.as_bytes())
                .map_err(stdout_error)?;
        }
    }
    Ok(ExitCode::Success)
}

fn write_fields() -> Result<ExitCode, AppError> {
    let mut stdout = std::io::stdout().lock();
    for field in &FIELDS {
        writeln!(
            stdout,
            "{:<18} {:<18} {}",
            field.key,
            field.rule.as_str(),
            field.default.unwrap_or("-")
        )
        .map_err(stdout_error)?;
    }
    Ok(ExitCode::Success)
}

fn write_completion(shell: CompletionShell) -> Result<ExitCode, AppError> {
    let mut command = Cli::command();
    let mut stdout = std::io::stdout().lock();
    match shell {
        CompletionShell::Bash => generate(Bash, &mut command, "dfgen", &mut stdout),
        CompletionShell::Zsh => generate(Zsh, &mut command, "dfgen", &mut stdout),
        CompletionShell::Fish => generate(Fish, &mut command, "dfgen", &mut stdout),
    }
    stdout.flush().map_err(stdout_error)?;
    Ok(ExitCode::Success)
}

fn stdout_error(source: std::io::Error) -> AppError {
    AppError::from(Error::io("<stdout>", source))
}
