//! Configuration structs for the flagfig demo application.
//!
//! The root [`DemoConfig`] mixes every kind of field flagfig binds:
//!
//! | Flag                    | Field                         | Kind              |
//! |-------------------------|-------------------------------|-------------------|
//! | `-v`, `--verbose`       | `verbose`                     | bool              |
//! | `--timeout`             | `timeout`                     | duration          |
//! | `--server.host`         | `server.host`                 | nested string     |
//! | `--server.port`         | `server.port`                 | nested u32        |
//! | `--tls`                 | `tls`                         | optional record   |
//! | `--tls.cert`            | `tls.cert`                    | string            |
//! | `--tls.expires`         | `tls.expires`                 | timestamp         |
//! | `--tags`                | `tags`                        | string list       |
//! | `--upstreams`           | `upstreams`                   | custom parser     |

use std::time::Duration;

use chrono::{DateTime, Utc};
use flagfig::{
    Field, FieldKind, Flags, Meta, ParseValueError, Pointee, SemanticType, ValueParser,
};
use serde::{Deserialize, Serialize};

pub const UPSTREAMS: SemanticType = SemanticType::Custom("upstreams");

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DemoConfig {
    /// Not a flag: only set in code.
    pub name: String,
    pub verbose: bool,
    pub timeout: Duration,
    pub server: ServerConfig,
    pub tls: Option<TlsConfig>,
    pub tags: Vec<String>,
    pub upstreams: Vec<Upstream>,
}

impl Flags for DemoConfig {
    const META: Meta = Meta {
        name: "DemoConfig",
        fields: &[
            Field::new("name", FieldKind::Leaf(SemanticType::String)),
            Field::new("verbose", FieldKind::Leaf(SemanticType::Bool))
                .describe("Enable verbose output")
                .short('v'),
            Field::new("timeout", FieldKind::Leaf(SemanticType::Duration))
                .describe("Request timeout"),
            Field::new("server", FieldKind::Nested(&ServerConfig::META))
                .describe("Server settings"),
            Field::new("tls", FieldKind::Optional(Pointee::Nested(&TlsConfig::META)))
                .describe("Enable TLS"),
            Field::new("tags", FieldKind::Leaf(SemanticType::StringList))
                .describe("Comma separated tags"),
            Field::new("upstreams", FieldKind::Leaf(UPSTREAMS))
                .describe("Upstream host:port, repeatable"),
        ],
    };
}

impl DemoConfig {
    pub fn defaults() -> Self {
        Self {
            name: "flagfig-demo".into(),
            verbose: false,
            timeout: Duration::from_secs(30),
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 3000,
            },
            tls: Some(TlsConfig {
                cert: "/etc/flagfig-demo/cert.pem".into(),
                expires: DateTime::from_timestamp(1_893_456_000, 0).unwrap_or_default(),
            }),
            tags: vec![],
            upstreams: vec![],
        }
    }

    /// What the program starts from before flags are applied: TLS off.
    pub fn initial() -> Self {
        Self {
            tls: None,
            ..Self::defaults()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u32,
}

impl Flags for ServerConfig {
    const META: Meta = Meta {
        name: "ServerConfig",
        fields: &[
            Field::new("host", FieldKind::Leaf(SemanticType::String))
                .describe("Hostname to bind to"),
            Field::new("port", FieldKind::Leaf(SemanticType::U32)).describe("Port number"),
        ],
    };
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TlsConfig {
    pub cert: String,
    pub expires: DateTime<Utc>,
}

impl Flags for TlsConfig {
    const META: Meta = Meta {
        name: "TlsConfig",
        fields: &[
            Field::new("cert", FieldKind::Leaf(SemanticType::String))
                .describe("Certificate path"),
            Field::new("expires", FieldKind::Leaf(SemanticType::Timestamp))
                .describe("Certificate expiry"),
        ],
    };
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Upstream {
    pub host: String,
    pub port: u32,
}

/// Reads `host:port`, appending one upstream per occurrence.
#[derive(Default)]
pub struct UpstreamParser {
    upstreams: Vec<Upstream>,
}

impl ValueParser for UpstreamParser {
    fn parse_text(&mut self, text: &str) -> Result<(), ParseValueError> {
        let (host, port) = text
            .rsplit_once(':')
            .ok_or_else(|| ParseValueError::new("expected host:port"))?;
        let port = port
            .parse()
            .map_err(|e| ParseValueError::new(format!("bad port '{port}': {e}")))?;
        self.upstreams.push(Upstream {
            host: host.to_string(),
            port,
        });
        Ok(())
    }

    fn current_value(&self) -> Result<serde_json::Value, ParseValueError> {
        Ok(serde_json::to_value(&self.upstreams)?)
    }

    fn set_value(&mut self, value: serde_json::Value) -> Result<(), ParseValueError> {
        self.upstreams = serde_json::from_value(value)?;
        Ok(())
    }

    fn format(&self) -> String {
        self.upstreams
            .iter()
            .map(|u| format!("{}:{}", u.host, u.port))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Configuration of the `version` command.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VersionConfig {
    pub short: bool,
}

impl Flags for VersionConfig {
    const META: Meta = Meta {
        name: "VersionConfig",
        fields: &[Field::new("short", FieldKind::Leaf(SemanticType::Bool))
            .describe("Print the version number only")],
    };
}
