//! Named commands, each binding its own configuration.
//!
//! The first argument selects a command when it is not a flag:
//!
//! ```ignore
//! let mut app = Flagfig::new(Command::new("myapp", "Serve things", &mut config, &defaults), args);
//! app.add_command(
//!     Command::new("version", "Print version", &mut version, &default_version)
//!         .run(|v: &VersionConfig| { println!("{}", v.version); Ok(()) }),
//! );
//! app.run()?;
//! ```
//!
//! With no command name the first command, the root, is used.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::args;
use crate::builder::{Loader, Report};
use crate::error::{BoxError, FlagfigError};
use crate::meta::{Flags, SemanticType};
use crate::parsers::{ParserFactory, ParserRegistry};

type RunFn<'a, C> = Box<dyn FnMut(&C) -> Result<(), BoxError> + 'a>;

/// A command: its name, its configuration and defaults, and what it runs.
pub struct Command<'a, C> {
    name: String,
    description: String,
    target: &'a mut C,
    defaults: &'a C,
    run: Option<RunFn<'a, C>>,
}

impl<'a, C> Command<'a, C> {
    pub fn new(name: &str, description: &str, target: &'a mut C, defaults: &'a C) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            target,
            defaults,
            run: None,
        }
    }

    /// Called with the loaded configuration by [`Flagfig::run`].
    pub fn run<F>(mut self, run: F) -> Self
    where
        F: FnMut(&C) -> Result<(), BoxError> + 'a,
    {
        self.run = Some(Box::new(run));
        self
    }
}

/// Object-safe view of a [`Command`], whatever its configuration type.
trait Bindable {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn bind(
        &mut self,
        args: &[String],
        custom: &ParserRegistry,
        program: &str,
        commands: Vec<(String, String)>,
    ) -> Result<Report, FlagfigError>;
    fn run(&mut self) -> Option<Result<(), BoxError>>;
}

impl<C> Bindable for Command<'_, C>
where
    C: Flags + Serialize + DeserializeOwned,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn bind(
        &mut self,
        args: &[String],
        custom: &ParserRegistry,
        program: &str,
        commands: Vec<(String, String)>,
    ) -> Result<Report, FlagfigError> {
        Loader::new(&mut *self.target, self.defaults)
            .args(args.iter().cloned())
            .parsers(custom)
            .program_name(program)
            .about(&self.description)
            .help_commands(commands)
            .load()
    }

    fn run(&mut self) -> Option<Result<(), BoxError>> {
        let run = self.run.as_mut()?;
        Some(run(&*self.target))
    }
}

/// A root command plus sub-commands, sharing one set of custom parsers.
pub struct Flagfig<'a> {
    commands: Vec<Box<dyn Bindable + 'a>>,
    args: Vec<String>,
    custom: ParserRegistry,
}

impl<'a> Flagfig<'a> {
    pub fn new<C, I, S>(root: Command<'a, C>, args: I) -> Self
    where
        C: Flags + Serialize + DeserializeOwned + 'a,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: vec![Box::new(root)],
            args: args.into_iter().map(Into::into).collect(),
            custom: ParserRegistry::new(),
        }
    }

    pub fn add_command<C>(&mut self, command: Command<'a, C>) -> &mut Self
    where
        C: Flags + Serialize + DeserializeOwned + 'a,
    {
        self.commands.push(Box::new(command));
        self
    }

    /// Register a parser for every command. A later registration for the
    /// same type replaces the earlier one.
    pub fn add_parser(&mut self, semantic: SemanticType, factory: ParserFactory) -> &mut Self {
        self.custom.register(semantic, factory);
        self
    }

    /// Name of the command the arguments select.
    pub fn command(&self) -> Result<&str, FlagfigError> {
        let (index, _) = self.select()?;
        Ok(self.commands[index].name())
    }

    /// Load the selected command's configuration from the rest of the
    /// arguments.
    pub fn parse(&mut self) -> Result<Report, FlagfigError> {
        let (index, skip) = self.select()?;
        let root = self.commands[0].name().to_string();
        let (program, listed) = if index == 0 {
            let listed = self.commands[1..]
                .iter()
                .map(|c| (c.name().to_string(), c.description().to_string()))
                .collect();
            (root, listed)
        } else {
            (format!("{root} {}", self.commands[index].name()), Vec::new())
        };
        debug!(command = %program, "parsing command");
        self.commands[index].bind(&self.args[skip..], &self.custom, &program, listed)
    }

    /// Parse, then call the selected command's run function.
    pub fn run(&mut self) -> Result<Report, FlagfigError> {
        let report = self.parse()?;
        let (index, _) = self.select()?;
        let command = &mut self.commands[index];
        match command.run() {
            None => Err(FlagfigError::NoRunFunction(command.name().to_string())),
            Some(Err(source)) => Err(FlagfigError::Run {
                command: command.name().to_string(),
                source,
            }),
            Some(Ok(())) => Ok(report),
        }
    }

    /// Index of the selected command and how many arguments its name took.
    fn select(&self) -> Result<(usize, usize), FlagfigError> {
        match args::split_command(&self.args) {
            (Some(name), _) => self
                .commands
                .iter()
                .position(|c| c.name().to_lowercase() == name)
                .map(|index| (index, 1))
                .ok_or(FlagfigError::CommandNotFound(name)),
            (None, _) => Ok((0, 0)),
        }
    }
}
