//! # flagfig demo application
//!
//! A sample CLI tool wired up with flagfig. It exists to demonstrate and
//! manually verify flag binding, not to do anything useful.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example flagfig_demo -- --help
//! cargo run --example flagfig_demo -- --server.port=8080 -v
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                    | How to exercise it                                                     |
//! |----------------------------|------------------------------------------------------------------------|
//! | Defaults                   | `cargo run --example flagfig_demo`                                     |
//! | Nested flag                | `cargo run --example flagfig_demo -- --server.port=8080`               |
//! | Short bool flag            | `cargo run --example flagfig_demo -- -v`                               |
//! | Bare activation            | `cargo run --example flagfig_demo -- --tls`                            |
//! | Descendant activation      | `cargo run --example flagfig_demo -- --tls.cert=/tmp/c.pem`            |
//! | String list                | `cargo run --example flagfig_demo -- --tags=a,b --tags c`              |
//! | Custom parser              | `cargo run --example flagfig_demo -- --upstreams a:1 --upstreams b:2`  |
//! | Case-insensitive names     | `cargo run --example flagfig_demo -- --Server.Port=9000`               |
//! | Sub-command                | `cargo run --example flagfig_demo -- version --short`                  |
//! | Help with defaults         | `cargo run --example flagfig_demo -- --help`                           |
//! | Debug logging              | `RUST_LOG=flagfig=debug cargo run --example flagfig_demo -- --tls`     |

mod config;

use std::process::ExitCode;

use flagfig::{
    Command, Flagfig, FlagfigError, OverridePolicy, ParserFactory, ParserRegistry, load_parsers,
    ops,
};
use tracing_subscriber::EnvFilter;

use config::{DemoConfig, UPSTREAMS, UpstreamParser, VersionConfig};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(FlagfigError::HelpRequested(help)) => {
            println!("{help}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            if err.is_usage_error() {
                eprintln!("Run with --help for usage.");
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), FlagfigError> {
    let defaults = DemoConfig::defaults();
    let mut config = DemoConfig::initial();
    let version_defaults = VersionConfig { short: false };
    let mut version = version_defaults.clone();

    let mut custom = ParserRegistry::new();
    custom.register(UPSTREAMS, ParserFactory::of::<UpstreamParser>());
    let parsers = load_parsers(&custom, OverridePolicy::Replace)?;

    let root = Command::new(
        "flagfig-demo",
        "flagfig demo, a sample CLI app for showcasing flag binding",
        &mut config,
        &defaults,
    )
    .run(|config: &DemoConfig| {
        println!("{}", config.name);
        println!("{}", ops::list_values(config, &parsers)?);
        Ok(())
    });
    let version_command =
        Command::new("version", "Print the version", &mut version, &version_defaults).run(
            |version: &VersionConfig| {
                if version.short {
                    println!("{}", env!("CARGO_PKG_VERSION"));
                } else {
                    println!("flagfig-demo {}", env!("CARGO_PKG_VERSION"));
                }
                Ok(())
            },
        );

    let mut app = Flagfig::new(root, std::env::args().skip(1));
    app.add_command(version_command);
    app.add_parser(UPSTREAMS, ParserFactory::of::<UpstreamParser>());

    let report = app.run()?;
    for diagnostic in &report.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    Ok(())
}
