//! Help text for the generated command line.
//!
//! Clap renders the help; this module only decides what goes into it: the
//! two-form usage line, the list of sub-commands, and each flag's description
//! followed by its formatted default.

use clap::{Arg, ArgAction};

use crate::catalog::{Catalog, EntryKind, FieldEntry};
use crate::defaults::DefaultsView;
use crate::parsers::ParserRegistry;

/// Program-level text shown by `--help`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HelpInfo {
    pub program: String,
    pub about: Option<String>,
    /// Other commands, as `(name, description)`, listed under the usage.
    pub commands: Vec<(String, String)>,
}

impl HelpInfo {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    pub fn command(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.commands.push((name.into(), description.into()));
        self
    }

    fn usage(&self) -> String {
        let program = &self.program;
        format!(
            "{program} [--flag=flag_argument] [-f[flag_argument]] ...     set flag_argument to flag(s)\n   \
             or: {program} [--flag[=true|false| ]] [-f[true|false| ]] ...     set true/false to boolean flag(s)"
        )
    }

    fn command_list(&self) -> Option<String> {
        if self.commands.is_empty() {
            return None;
        }
        let mut text = String::from("Available Commands:\n");
        for (name, description) in &self.commands {
            text.push_str(&format!("  {name:<20} {description}\n"));
        }
        text.push_str(&format!(
            "Use \"{} [command] --help\" for more information about a command.",
            self.program
        ));
        Some(text)
    }
}

/// The clap command every flag gets registered on.
pub(crate) fn base_command(info: &HelpInfo) -> clap::Command {
    let mut command = clap::Command::new(info.program.clone())
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .override_usage(info.usage());
    if let Some(about) = &info.about {
        command = command.about(about.clone());
    }
    if let Some(commands) = info.command_list() {
        command = command.after_help(commands);
    }
    command
}

/// `--help`/`-h`, minus whichever of the two a configuration flag already
/// claims. `None` when both are taken.
pub(crate) fn help_arg(catalog: &Catalog) -> Option<Arg> {
    let long_free = !catalog.contains("help");
    let short_free = !catalog
        .iter()
        .any(|e| e.short.map(|s| s.to_ascii_lowercase()) == Some('h'));
    if !long_free && !short_free {
        return None;
    }
    let mut arg = Arg::new("__flagfig_help")
        .action(ArgAction::Help)
        .help("Print help");
    if long_free {
        arg = arg.long("help");
    }
    if short_free {
        arg = arg.short('h');
    }
    Some(arg)
}

/// A flag's description followed by its default, as the parser formats it.
///
/// Activation flags show no default: their default is a whole record.
pub(crate) fn describe(
    entry: &FieldEntry,
    registry: &ParserRegistry,
    defaults: Option<&DefaultsView>,
) -> String {
    let description = entry.description.to_string();
    if entry.kind == EntryKind::Activation {
        return description;
    }
    let Some(default) = defaults.and_then(|view| view.get(&entry.name)) else {
        return description;
    };
    let Some(mut parser) = registry.create(&entry.semantic) else {
        return description;
    };
    match parser.set_value(default.clone()) {
        Ok(()) => format!("{description} (default \"{}\")", parser.format()),
        Err(_) => description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::*;
    use crate::meta::Flags;

    fn setup() -> (Catalog, DefaultsView) {
        let defaults = serde_json::to_value(default_configuration()).unwrap();
        let catalog = Catalog::build(&Configuration::META, &defaults).unwrap();
        let view = DefaultsView::build(&Configuration::META, &defaults);
        (catalog, view)
    }

    #[test]
    fn describe_appends_formatted_default() {
        let (catalog, view) = setup();
        let registry = ParserRegistry::with_builtins();
        let text = describe(catalog.get("timeout").unwrap(), &registry, Some(&view));
        assert_eq!(text, "Timeout duration (default \"1ms\")");
    }

    #[test]
    fn describe_without_defaults_is_plain() {
        let (catalog, _) = setup();
        let registry = ParserRegistry::with_builtins();
        let text = describe(catalog.get("loglevel").unwrap(), &registry, None);
        assert_eq!(text, "Log level");
    }

    #[test]
    fn activation_flags_show_no_default() {
        let (catalog, view) = setup();
        let registry = ParserRegistry::with_builtins();
        let text = describe(catalog.get("db").unwrap(), &registry, Some(&view));
        assert_eq!(text, "Enable database");
    }

    #[test]
    fn custom_parser_formats_default() {
        let (catalog, view) = setup();
        let mut registry = ParserRegistry::with_builtins();
        registry.register(
            SERVERS,
            crate::parsers::ParserFactory::of::<ServerListParser>(),
        );
        let text = describe(catalog.get("owner.servers").unwrap(), &registry, Some(&view));
        assert_eq!(
            text,
            "Owner Server (default \"[192.168.1.2 192.168.1.3 192.168.1.4]\")"
        );
    }

    #[test]
    fn help_arg_claims_free_names() {
        let (catalog, _) = setup();
        let arg = help_arg(&catalog).unwrap();
        assert_eq!(arg.get_long(), Some("help"));
        assert_eq!(arg.get_short(), Some('h'));
    }

    #[test]
    fn command_list_in_after_help() {
        let info = HelpInfo::new("app").command("version", "Print version");
        let text = info.command_list().unwrap();
        assert!(text.contains("version"));
        assert!(text.contains("Print version"));
        assert!(HelpInfo::new("app").command_list().is_none());
    }

    #[test]
    fn usage_names_program() {
        let usage = HelpInfo::new("myapp").usage();
        assert!(usage.starts_with("myapp [--flag=flag_argument]"));
        assert!(usage.contains("or: myapp [--flag[=true|false| ]]"));
    }
}
