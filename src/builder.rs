use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::binder::Binder;
use crate::catalog::Catalog;
use crate::defaults::DefaultsView;
use crate::error::FlagfigError;
use crate::help::HelpInfo;
use crate::meta::{Flags, SemanticType};
use crate::parsers::{self, OverridePolicy, ParserFactory, ParserRegistry};
use crate::reconcile::{self, write_back};

/// Bind command-line arguments onto `target`.
///
/// Flags given in `args` win; everything else comes from `defaults`, except
/// optional records `target` already holds, which are kept and only updated
/// by the flags below them. `custom` parsers are added to the built-ins.
///
/// Flags whose type has no parser are left unbound and reported as
/// [`FlagfigError::MissingParsers`] after `target` has been written. Use
/// [`Loader`] to get them as a [`Report`] instead.
pub fn load<C, I, S>(
    target: &mut C,
    defaults: &C,
    args: I,
    custom: &ParserRegistry,
) -> Result<(), FlagfigError>
where
    C: Flags + Serialize + DeserializeOwned,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Loader::new(target, defaults)
        .args(args)
        .parsers(custom)
        .load()?
        .into_result()
}

/// Builder for one load.
///
/// ```ignore
/// let report = Loader::new(&mut config, &defaults)
///     .args(std::env::args().skip(1))
///     .parser(SemanticType::Custom("servers"), ParserFactory::of::<ServerList>())
///     .about("My server")
///     .load()?;
/// ```
pub struct Loader<'a, C> {
    target: &'a mut C,
    defaults: &'a C,
    args: Vec<String>,
    custom: ParserRegistry,
    policy: OverridePolicy,
    help: HelpInfo,
}

impl<'a, C> Loader<'a, C>
where
    C: Flags + Serialize + DeserializeOwned,
{
    pub fn new(target: &'a mut C, defaults: &'a C) -> Self {
        Self {
            target,
            defaults,
            args: Vec::new(),
            custom: ParserRegistry::new(),
            policy: OverridePolicy::default(),
            help: HelpInfo::new(program_name()),
        }
    }

    /// Arguments to parse, without the program name.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Add every parser in `custom`.
    pub fn parsers(mut self, custom: &ParserRegistry) -> Self {
        for (semantic, factory) in custom.iter() {
            self.custom.register(*semantic, factory.clone());
        }
        self
    }

    pub fn parser(mut self, semantic: SemanticType, factory: ParserFactory) -> Self {
        self.custom.register(semantic, factory);
        self
    }

    /// What happens when a custom parser targets a built-in type
    /// (default: [`OverridePolicy::Replace`]).
    pub fn override_policy(mut self, policy: OverridePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Program name shown in `--help` (default: the running executable).
    pub fn program_name(mut self, name: &str) -> Self {
        self.help.program = name.to_string();
        self
    }

    pub fn about(mut self, about: &str) -> Self {
        self.help.about = Some(about.to_string());
        self
    }

    /// Other commands to list in `--help`.
    pub(crate) fn help_commands(mut self, commands: Vec<(String, String)>) -> Self {
        self.help.commands = commands;
        self
    }

    /// Parse the arguments and write the result into the target.
    ///
    /// The target is only replaced once the whole configuration has been
    /// reconciled; on error it is left as it was.
    pub fn load(self) -> Result<Report, FlagfigError> {
        let registry = parsers::load_parsers(&self.custom, self.policy)?;

        let mut tree = serde_json::to_value(&*self.target)?;
        let defaults = serde_json::to_value(self.defaults)?;
        let catalog = Catalog::build_with_defaults(&C::META, &tree, &defaults)?;
        let view = DefaultsView::build(&C::META, &defaults);
        debug!(
            record = C::META.name,
            parsers = registry.len(),
            defaults = view.len(),
            "loading configuration"
        );

        let parsed = Binder::new(&catalog, &registry)
            .help(&self.help)
            .defaults(&view)
            .parse(self.args)?;
        reconcile::reconcile(&C::META, &mut tree, &view, &parsed.values)?;
        *self.target = write_back(tree)?;

        Ok(Report {
            diagnostics: parsed.diagnostics,
        })
    }
}

/// Outcome of a successful load.
#[derive(Debug, Default)]
pub struct Report {
    /// Flags left unbound, one [`FlagfigError::MissingParser`] each.
    pub diagnostics: Vec<FlagfigError>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// `Err(MissingParsers)` if any flag was left unbound.
    pub fn into_result(self) -> Result<(), FlagfigError> {
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(FlagfigError::MissingParsers(self.diagnostics))
        }
    }
}

fn program_name() -> String {
    std::env::args()
        .next()
        .and_then(|path| {
            std::path::Path::new(&path)
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "app".to_string())
}
