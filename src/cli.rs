//! Minimal CLI: check documents against a type expression, or inspect the prelude.
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;

use json_adt::prelude::Registry;
use json_adt::{Config, Validator, type_expr};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// check JSON/NDJSON documents against algebraic type expressions
#[derive(Parser, Debug)]
#[command(name = "json-adt", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// check every input document against a type expression
    Check(CheckOut),
    /// validate the built-in definitions and print their generic shape
    Definitions(DefinitionsOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct ValidatorSettings {
    /// JSON config file (discriminator, debug, max_definition_depth)
    #[arg(long)]
    config: Option<PathBuf>,

    /// tagged-union discriminator key (overrides the config file)
    #[arg(long)]
    discriminator: Option<String>,

    /// log expansions and failures
    #[arg(long, default_value_t = false)]
    debug: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    /// type expression, e.g. 'List(number)' or 'Map(Optional(string))'
    #[arg(long = "type", short = 't')]
    type_expr: String,

    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    validator_settings: ValidatorSettings,

    /// only report failures
    #[arg(long, short)]
    quiet: bool,
}

#[derive(clap::Parser, Debug)]
struct DefinitionsOut {
    #[command(flatten)]
    validator_settings: ValidatorSettings,
}

/// One checkable document and where it came from.
#[derive(Debug)]
struct Document {
    source: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut out = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file ({source_path_str})"))?;
            if self.ndjson {
                for (ix, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let json_value = serde_json::from_str::<Value>(line).with_context(|| {
                        format!("failed to parse NDJSON line ({source_path_str}:{})", ix + 1)
                    })?;
                    self.select(format!("{source_path_str}:{}", ix + 1), json_value, &mut out)?;
                }
            } else {
                let json_value = serde_json::from_str::<Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
                self.select(source_path_str, json_value, &mut out)?;
            }
        }
        Ok(out)
    }

    /// Apply `--json-pointer` then `--jq-expr`.
    fn select(&self, source: String, json_value: Value, out: &mut Vec<Document>) -> Result<()> {
        let json_value = match self.json_pointer.as_deref() {
            None => json_value,
            Some(pointer) => json_value
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {pointer} selects nothing in {source}"))?,
        };
        match self.jq_expr.as_ref() {
            None => out.push(Document { source, value: json_value }),
            Some(jq_expr) => {
                let results = crate::jq_exec::run_jaq(jq_expr, &json_value)
                    .with_context(|| format!("failed to apply jq expression to {source}"))?;
                for (ix, value) in results.into_iter().enumerate() {
                    out.push(Document { source: format!("{source}#{ix}"), value });
                }
            }
        }
        Ok(())
    }
}

impl ValidatorSettings {
    fn validator(&self) -> Result<Validator> {
        let mut config = match self.config.as_ref() {
            Some(path) => Config::from_path(path)?,
            None => Config::default(),
        };
        if let Some(discriminator) = self.discriminator.as_ref() {
            config.discriminator = discriminator.clone();
        }
        config.debug |= self.debug;
        Ok(Validator::new(config))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn debug(&self) -> bool {
        match &self.cmd {
            Command::Check(target) => target.validator_settings.debug,
            Command::Definitions(target) => target.validator_settings.debug,
        }
    }

    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Check(target) => {
                let validator = target.validator_settings.validator()?;
                let registry = Registry::prelude();

                // 1) resolve the type and make sure every definition it uses is sound
                let ty = type_expr::parse(&target.type_expr, &registry)
                    .with_context(|| format!("invalid type expression '{}'", target.type_expr))?;
                for factory in ty.factories() {
                    validator
                        .validate_definition(&factory)
                        .with_context(|| format!("definition of '{}' is malformed", factory.name()))?;
                }

                // 2) load documents
                let documents = target.input_settings.load_documents()?;
                if documents.is_empty() {
                    bail!("no input documents");
                }

                // 3) check in parallel, report in input order
                let outcomes = documents
                    .par_iter()
                    .map(|doc| validator.check(&ty, &doc.value).map(drop))
                    .collect::<Vec<_>>();

                let mut failed = 0usize;
                for (doc, outcome) in documents.iter().zip(&outcomes) {
                    match outcome {
                        Ok(()) => {
                            if !target.quiet {
                                println!("{} {}", "✅".green(), doc.source);
                            }
                        }
                        Err(error) => {
                            failed += 1;
                            println!(
                                "{} {}: {} {}",
                                "❌".red(),
                                doc.source,
                                format!("[{}]", error.kind()).yellow(),
                                error
                            );
                        }
                    }
                }
                eprintln!("{} of {} documents match {ty}", documents.len() - failed, documents.len());
                Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
            Command::Definitions(target) => {
                let validator = target.validator_settings.validator()?;
                let mut failed = false;
                for factory in Registry::prelude().iter() {
                    match validator.validate_definition(factory) {
                        Ok(description) => println!("{} {description}", "✅".green()),
                        Err(error) => {
                            failed = true;
                            println!("{} {}: {error}", "❌".red(), factory.name());
                        }
                    }
                }
                Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // an explicit glob that matched nothing is almost always a typo
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        CommandLineInterface::command().debug_assert();
    }

    #[test]
    fn parses_check_arguments() {
        let cli = CommandLineInterface::try_parse_from([
            "json-adt", "check", "--type", "List(number)", "-i", "a.json", "b.json", "--discriminator", "tag",
            "--debug",
        ])
        .unwrap();
        assert!(cli.debug());
        let Command::Check(target) = &cli.cmd else { panic!("expected check") };
        assert_eq!(target.type_expr, "List(number)");
        assert_eq!(target.input_settings.input, vec!["a.json", "b.json"]);
        let validator = target.validator_settings.validator().unwrap();
        assert_eq!(validator.config().discriminator, "tag");
        assert!(validator.config().debug);
    }

    #[test]
    fn pointer_and_literal_inputs() {
        let settings = InputSettings {
            ndjson: false,
            json_pointer: Some("/data/0".into()),
            jq_expr: None,
            input: vec![],
        };
        let mut out = Vec::new();
        settings
            .select("mem".into(), serde_json::json!({ "data": [{ "x": 1 }] }), &mut out)
            .unwrap();
        assert_eq!(out[0].value, serde_json::json!({ "x": 1 }));
        assert!(settings.select("mem".into(), serde_json::json!({}), &mut out).is_err());

        let paths = resolve_file_path_patterns(["plain/path.json"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("plain/path.json")]);
    }

    #[test]
    fn check_runs_over_ndjson_with_jq() {
        let dir = std::env::temp_dir().join(format!("json-adt-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("lists.ndjson");
        let nil = r#"{"constr":"Nil","Nil":{}}"#;
        let one = format!(r#"{{"constr":"Cons","Cons":{{"head":1,"tail":{nil}}}}}"#);
        let bad = format!(r#"{{"constr":"Cons","Cons":{{"head":"x","tail":{nil}}}}}"#);
        std::fs::write(&path, format!("[{nil},{one}]\n\n[{bad}]\n")).unwrap();
        let path_str = path.to_string_lossy().to_string();

        let cli = |ty: &str| {
            CommandLineInterface::try_parse_from([
                "json-adt", "check", "-t", ty, "--ndjson", "--jq-expr", ".[]", "-q", "-i", path_str.as_str(),
            ])
            .unwrap()
        };
        let parsed = cli("List(number)");
        let Command::Check(target) = &parsed.cmd else { panic!("expected check") };
        let documents = target.input_settings.load_documents().unwrap();
        let sources = documents.iter().map(|d| d.source.as_str()).collect::<Vec<_>>();
        assert_eq!(
            sources,
            vec![format!("{path_str}:1#0"), format!("{path_str}:1#1"), format!("{path_str}:3#0")]
        );

        let exit_code = |ty: &str| format!("{:?}", cli(ty).run().unwrap());
        assert_eq!(exit_code("List(number)"), format!("{:?}", ExitCode::FAILURE));
        std::fs::write(&path, format!("[{nil},{one}]\n")).unwrap();
        assert_eq!(exit_code("List(number)"), format!("{:?}", ExitCode::SUCCESS));
        assert!(cli("List(").run().is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
