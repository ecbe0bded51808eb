use crate::cli::main_types::{ConfigCommands, OutputFormat};
use crate::core::flatten::Flattener;
use crate::core::ident::generate_unique_ids;
use crate::core::sequence::Numbers;
use crate::core::value::Value;
use crate::display::TableDisplay;
use crate::error::{AppError, CliError, InputError};
use crate::storage::config::{CONFIG_KEYS, Config};
use crate::utils::file::{FileHandle, FileSource, open_reader, open_writer, read_to_string};
use crate::utils::logging::{VerboseLogger, log_warning};
use crate::utils::opener::DefaultOpener;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

/// Read and parse a JSON document from a path, or from stdin for `None` / `-`
pub fn read_json_input(file: Option<&str>, logger: &VerboseLogger) -> Result<Value, AppError> {
    let (source, label) = match file {
        None | Some("-") => (
            FileSource::Handle(FileHandle::Reader(Box::new(BufReader::new(io::stdin())))),
            "<stdin>".to_string(),
        ),
        Some(path) => (FileSource::from(path), path.to_string()),
    };
    logger.log(&format!("Reading JSON from {}", label));

    let content = read_to_string(source, &label)?;
    let json: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| InputError::Json {
            path: label,
            message: e.to_string(),
        })?;
    Ok(Value::from(json))
}

fn write_stdout(text: &str) -> Result<(), AppError> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", text).map_err(|e| CliError::Output(e.to_string()))?;
    Ok(())
}

fn write_lines<I, S>(lines: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut stdout = io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{}", line.as_ref()).map_err(|e| CliError::Output(e.to_string()))?;
    }
    Ok(())
}

pub struct FlattenHandler<'a> {
    config: &'a Config,
    display: &'a TableDisplay,
    logger: VerboseLogger,
}

impl<'a> FlattenHandler<'a> {
    pub fn new(config: &'a Config, display: &'a TableDisplay, logger: VerboseLogger) -> Self {
        Self {
            config,
            display,
            logger,
        }
    }

    pub fn flatten(&self, file: Option<&str>, format: OutputFormat) -> Result<(), AppError> {
        let value = read_json_input(file, &self.logger)?;
        let flattener = Flattener::new().with_max_depth(self.config.flatten.max_depth);
        self.logger.log(&format!(
            "Flattening {} (max depth: {:?})",
            value.kind_name(),
            flattener.max_depth()
        ));

        let flat = flattener.flatten(&value)?;
        let leaves = flat
            .items()
            .map(<[Value]>::to_vec)
            .unwrap_or_else(|| vec![flat.clone()]);
        self.logger.log(&format!("Found {} leaves", leaves.len()));

        match format {
            OutputFormat::Json => write_stdout(&flat.to_json()?.to_string()),
            OutputFormat::Lines => write_lines(leaves.iter().map(Value::make_str)),
            OutputFormat::Table => write_stdout(&self.display.render_leaves(&leaves)),
        }
    }

    pub fn check(&self, file: Option<&str>, format: OutputFormat) -> Result<(), AppError> {
        let value = read_json_input(file, &self.logger)?;
        let leaf_count = Flattener::new()
            .with_max_depth(self.config.flatten.max_depth)
            .leaves(&value)?
            .len();

        let checks: Vec<(&str, String)> = vec![
            ("kind", value.kind_name().to_string()),
            ("text", value.is_text().to_string()),
            ("container", value.is_container().to_string()),
            ("int_list", value.is_int_list().to_string()),
            ("leaves", leaf_count.to_string()),
        ];

        match format {
            OutputFormat::Json => {
                let report = serde_json::json!({
                    "kind": value.kind_name(),
                    "text": value.is_text(),
                    "container": value.is_container(),
                    "int_list": value.is_int_list(),
                    "leaves": leaf_count,
                });
                write_stdout(&report.to_string())
            }
            OutputFormat::Lines => write_lines(
                checks
                    .iter()
                    .map(|(name, result)| format!("{}: {}", name, result)),
            ),
            OutputFormat::Table => write_stdout(&self.display.render_pairs(&checks)),
        }
    }
}

pub struct SequenceHandler<'a> {
    display: &'a TableDisplay,
    logger: VerboseLogger,
}

impl<'a> SequenceHandler<'a> {
    pub fn new(display: &'a TableDisplay, logger: VerboseLogger) -> Self {
        Self { display, logger }
    }

    pub fn cumsum(&self, numbers: &[String], format: OutputFormat) -> Result<(), AppError> {
        let numbers = Numbers::parse(numbers)?;
        self.logger.log(&format!(
            "Summing {} {}",
            numbers.len(),
            match numbers {
                Numbers::Ints(_) => "integers",
                Numbers::Floats(_) => "floats",
            }
        ));

        match format {
            OutputFormat::Json => write_stdout(&numbers.totals_json()?.to_string()),
            OutputFormat::Lines => {
                write_lines(numbers.running_totals()?.into_iter().map(|(_, total)| total))
            }
            OutputFormat::Table => {
                write_stdout(&self.display.render_running_totals(&numbers.running_totals()?))
            }
        }
    }

    pub fn uuid(&self, count: usize, format: OutputFormat) -> Result<(), AppError> {
        if count == 0 {
            return Err(
                CliError::InvalidArguments("--count must be at least 1".to_string()).into(),
            );
        }
        let ids = generate_unique_ids(count);
        self.logger.log(&format!("Generated {} ids", ids.len()));
        match format {
            OutputFormat::Json if count == 1 => {
                write_stdout(&serde_json::Value::from(ids[0].as_str()).to_string())
            }
            OutputFormat::Json => write_stdout(&serde_json::Value::from(ids).to_string()),
            OutputFormat::Lines => write_lines(ids),
            OutputFormat::Table => {
                let labels: Vec<String> = (0..ids.len()).map(|i| i.to_string()).collect();
                let pairs: Vec<(&str, String)> = labels
                    .iter()
                    .map(String::as_str)
                    .zip(ids.iter().cloned())
                    .collect();
                write_stdout(&self.display.render_pairs(&pairs))
            }
        }
    }
}

pub struct FileHandler {
    logger: VerboseLogger,
}

impl FileHandler {
    pub fn new(logger: VerboseLogger) -> Self {
        Self { logger }
    }

    pub fn cat(&self, file: &str) -> Result<(), AppError> {
        self.logger.log(&format!("Streaming {}", file));
        let mut reader = open_reader(file)?;
        let mut stdout = io::stdout().lock();
        let copied = io::copy(&mut reader, &mut stdout).map_err(|source| InputError::Io {
            path: file.to_string(),
            source,
        })?;
        stdout
            .flush()
            .map_err(|e| CliError::Output(e.to_string()))?;
        self.logger.log(&format!("Wrote {} bytes", copied));
        Ok(())
    }

    pub fn write(&self, file: &str, append: bool) -> Result<(), AppError> {
        self.logger.log(&format!(
            "{} {} from stdin",
            if append { "Appending to" } else { "Writing" },
            file
        ));
        let mut writer = open_writer(file, append)?;
        let copied =
            io::copy(&mut io::stdin().lock(), &mut writer).map_err(|source| InputError::Io {
                path: file.to_string(),
                source,
            })?;
        writer.finish()?;
        if copied == 0 {
            log_warning(&format!("stdin was empty, {} holds no data", file));
        }
        self.logger.log(&format!("Copied {} bytes", copied));
        Ok(())
    }

    pub async fn open(&self, file: &str, config: &Config) -> Result<(), AppError> {
        let opener = DefaultOpener::new()
            .with_command(config.opener.command.clone())
            .with_logger(self.logger);
        opener.open(file).await
    }
}

pub struct ConfigHandler<'a> {
    config_path: Option<PathBuf>,
    display: &'a TableDisplay,
    logger: VerboseLogger,
}

impl<'a> ConfigHandler<'a> {
    pub fn new(
        config_path: Option<PathBuf>,
        display: &'a TableDisplay,
        logger: VerboseLogger,
    ) -> Self {
        Self {
            config_path,
            display,
            logger,
        }
    }

    pub fn handle(
        &self,
        command: ConfigCommands,
        config: &Config,
        format: OutputFormat,
    ) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => {
                self.logger.log("Showing configuration");
                match format {
                    OutputFormat::Json => {
                        let json = serde_json::to_string(config)
                            .map_err(|e| CliError::Output(e.to_string()))?;
                        write_stdout(&json)
                    }
                    OutputFormat::Lines => write_lines(CONFIG_KEYS.iter().map(|key| {
                        format!("{} = {}", key, config.get(key).unwrap_or_default())
                    })),
                    OutputFormat::Table => {
                        let pairs: Vec<(&str, String)> = CONFIG_KEYS
                            .iter()
                            .map(|key| (*key, config.get(key).unwrap_or_default()))
                            .collect();
                        write_stdout(&self.display.render_pairs(&pairs))
                    }
                }
            }
            ConfigCommands::Set { key, value } => {
                self.logger.log(&format!(
                    "Attempting config set - key: {}, value: {}",
                    key, value
                ));
                let mut updated = config.clone();
                updated.set(&key, &value)?;
                updated.save(self.config_path.clone())?;
                write_stdout(&format!(
                    "✅ {} = {}",
                    key,
                    updated.get(&key).unwrap_or_default()
                ))
            }
        }
    }
}
