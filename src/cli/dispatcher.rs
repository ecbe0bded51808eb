use crate::cli::command_handlers::{ConfigHandler, FileHandler, FlattenHandler, SequenceHandler};
use crate::cli::main_types::{Commands, OutputFormat};
use crate::display::{TableDisplay, colors_enabled};
use crate::error::AppError;
use crate::storage::config::Config;
use crate::utils::logging::VerboseLogger;
use std::path::PathBuf;

pub struct Dispatcher {
    config: Config,
    config_path: Option<PathBuf>,
    format: OutputFormat,
    display: TableDisplay,
    logger: VerboseLogger,
}

impl Dispatcher {
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        format: OutputFormat,
        verbose: bool,
    ) -> Self {
        let display = TableDisplay::new()
            .with_max_width(config.display.max_width)
            .with_colors(colors_enabled(config.display.use_colors));

        Self {
            config,
            config_path,
            format,
            display,
            logger: VerboseLogger::new(verbose),
        }
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        self.logger
            .log(&format!("Dispatching {:?} as {:?}", command, self.format));

        match command {
            Commands::Flatten { file } => FlattenHandler::new(&self.config, &self.display, self.logger)
                .flatten(file.as_deref(), self.format),
            Commands::Check { file } => FlattenHandler::new(&self.config, &self.display, self.logger)
                .check(file.as_deref(), self.format),
            Commands::Cumsum { numbers } => {
                SequenceHandler::new(&self.display, self.logger).cumsum(&numbers, self.format)
            }
            Commands::Uuid { count } => {
                SequenceHandler::new(&self.display, self.logger).uuid(count, self.format)
            }
            Commands::Cat { file } => FileHandler::new(self.logger).cat(&file),
            Commands::Write { file, append } => FileHandler::new(self.logger).write(&file, append),
            Commands::Open { file } => FileHandler::new(self.logger).open(&file, &self.config).await,
            Commands::Config { command } => {
                ConfigHandler::new(self.config_path.clone(), &self.display, self.logger)
                    .handle(command, &self.config, self.format)
            }
        }
    }
}
