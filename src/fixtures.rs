#[cfg(test)]
pub mod test {
    use std::time::Duration;

    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    use crate::meta::{Field, FieldKind, Flags, Meta, Pointee, SemanticType};
    use crate::parsers::{ParseValueError, ValueParser};

    /// Root configuration mixing every field kind.
    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct Configuration {
        /// Not annotated, never a flag.
        pub name: String,
        pub log_level: String,
        pub timeout: Duration,
        pub db: Option<DatabaseInfo>,
        pub owner: Option<OwnerInfo>,
    }

    impl Flags for Configuration {
        const META: Meta = Meta {
            name: "Configuration",
            fields: &[
                Field::new("name", FieldKind::Leaf(SemanticType::String)),
                Field::new("log_level", FieldKind::Leaf(SemanticType::String))
                    .describe("Log level")
                    .long("loglevel")
                    .short('l'),
                Field::new("timeout", FieldKind::Leaf(SemanticType::Duration))
                    .describe("Timeout duration"),
                Field::new("db", FieldKind::Optional(Pointee::Nested(&DatabaseInfo::META)))
                    .describe("Enable database"),
                Field::new("owner", FieldKind::Optional(Pointee::Nested(&OwnerInfo::META)))
                    .describe("Enable Owner description"),
            ],
        };
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
    pub struct ServerInfo {
        pub watch: bool,
        pub ip: String,
        pub load: i32,
        pub load64: i64,
    }

    impl Flags for ServerInfo {
        const META: Meta = Meta {
            name: "ServerInfo",
            fields: &[
                Field::new("watch", FieldKind::Leaf(SemanticType::Bool)).describe("Watch device"),
                Field::new("ip", FieldKind::Leaf(SemanticType::String))
                    .describe("Server ip address"),
                Field::new("load", FieldKind::Leaf(SemanticType::I32)).describe("Server load"),
                Field::new("load64", FieldKind::Leaf(SemanticType::I64)).describe("Server load"),
            ],
        };
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
    pub struct DatabaseInfo {
        #[serde(flatten)]
        pub server: ServerInfo,
        pub connection_max: u32,
        pub connection_max64: u64,
    }

    impl Flags for DatabaseInfo {
        const META: Meta = Meta {
            name: "DatabaseInfo",
            fields: &[
                Field::embedded("server", &ServerInfo::META),
                Field::new("connection_max", FieldKind::Leaf(SemanticType::U32))
                    .describe("Number max of connections on database")
                    .long("comax"),
                Field::new("connection_max64", FieldKind::Leaf(SemanticType::U64))
                    .describe("Number max of connections on database"),
            ],
        };
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct OwnerInfo {
        pub name: Option<String>,
        pub date_of_birth: DateTime<Utc>,
        pub rate: f64,
        pub servers: Vec<ServerInfo>,
    }

    impl Flags for OwnerInfo {
        const META: Meta = Meta {
            name: "OwnerInfo",
            fields: &[
                Field::new("name", FieldKind::Optional(Pointee::Leaf(SemanticType::String)))
                    .describe("Owner name"),
                Field::new("date_of_birth", FieldKind::Leaf(SemanticType::Timestamp))
                    .describe("Owner date of birth")
                    .long("dob"),
                Field::new("rate", FieldKind::Leaf(SemanticType::F64)).describe("Owner rate"),
                Field::new("servers", FieldKind::Leaf(SERVERS)).describe("Owner Server"),
            ],
        };
    }

    pub const SERVERS: SemanticType = SemanticType::Custom("servers");

    pub fn timestamp(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    pub fn server(ip: &str) -> ServerInfo {
        ServerInfo {
            ip: ip.into(),
            ..ServerInfo::default()
        }
    }

    pub fn default_configuration() -> Configuration {
        Configuration {
            name: "defaultName".into(),
            log_level: "ERROR".into(),
            timeout: Duration::from_millis(1),
            db: Some(DatabaseInfo {
                server: ServerInfo {
                    watch: true,
                    ip: "192.168.1.2".into(),
                    load: 32,
                    load64: 64,
                },
                connection_max: 3_200_000_000,
                connection_max64: 6_400_000_000_000_000_000,
            }),
            owner: Some(OwnerInfo {
                name: Some("DefaultOwnerNamePointer".into()),
                date_of_birth: timestamp("1979-05-27T07:32:00Z"),
                rate: 0.111,
                servers: vec![
                    server("192.168.1.2"),
                    server("192.168.1.3"),
                    server("192.168.1.4"),
                ],
            }),
        }
    }

    pub fn initial_configuration() -> Configuration {
        Configuration {
            name: "initName".into(),
            log_level: "DEBUG".into(),
            timeout: Duration::from_secs(1),
            db: None,
            owner: Some(OwnerInfo {
                name: Some("InitOwnerNamePointer".into()),
                date_of_birth: timestamp("1993-09-12T07:32:00Z"),
                rate: 0.999,
                servers: vec![],
            }),
        }
    }

    /// Custom parser: every occurrence appends a server with that ip.
    #[derive(Default)]
    pub struct ServerListParser {
        servers: Vec<ServerInfo>,
    }

    impl ValueParser for ServerListParser {
        fn parse_text(&mut self, text: &str) -> Result<(), ParseValueError> {
            self.servers.push(server(text));
            Ok(())
        }

        fn current_value(&self) -> Result<serde_json::Value, ParseValueError> {
            serde_json::to_value(&self.servers).map_err(ParseValueError::from)
        }

        fn set_value(&mut self, value: serde_json::Value) -> Result<(), ParseValueError> {
            self.servers = serde_json::from_value(value)?;
            Ok(())
        }

        fn format(&self) -> String {
            let ips: Vec<&str> = self.servers.iter().map(|s| s.ip.as_str()).collect();
            format!("[{}]", ips.join(" "))
        }
    }

    // -- Fixture for optional sub-structure activation -------------------------

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct StructPtr {
        pub ptr_struct1: Option<Struct1>,
        pub ptr_struct2: Option<Struct2>,
    }

    impl Flags for StructPtr {
        const META: Meta = Meta {
            name: "StructPtr",
            fields: &[
                Field::new("ptr_struct1", FieldKind::Optional(Pointee::Nested(&Struct1::META)))
                    .describe("Enable Struct1")
                    .long("ptrstruct1"),
                Field::new("ptr_struct2", FieldKind::Optional(Pointee::Nested(&Struct2::META)))
                    .describe("Enable Struct2")
                    .long("ptrstruct2"),
            ],
        };
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct Struct1 {
        pub s1_int: i32,
        pub s1_string: String,
        pub s1_bool: bool,
    }

    impl Flags for Struct1 {
        const META: Meta = Meta {
            name: "Struct1",
            fields: &[
                Field::new("s1_int", FieldKind::Leaf(SemanticType::I32)).describe("Struct 1 Int"),
                Field::new("s1_string", FieldKind::Leaf(SemanticType::String))
                    .describe("Struct 1 String"),
                Field::new("s1_bool", FieldKind::Leaf(SemanticType::Bool))
                    .describe("Struct 1 Bool"),
            ],
        };
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct Struct2 {
        pub s2_int64: i64,
        pub s2_string: String,
        pub s2_bool: bool,
        pub inner: Option<Struct1>,
    }

    impl Flags for Struct2 {
        const META: Meta = Meta {
            name: "Struct2",
            fields: &[
                Field::new("s2_int64", FieldKind::Leaf(SemanticType::I64))
                    .describe("Struct 2 Int64"),
                Field::new("s2_string", FieldKind::Leaf(SemanticType::String))
                    .describe("Struct 2 String"),
                Field::new("s2_bool", FieldKind::Leaf(SemanticType::Bool))
                    .describe("Struct 2 Bool"),
                Field::new("inner", FieldKind::Optional(Pointee::Nested(&Struct1::META)))
                    .describe("Enable inner Struct1"),
            ],
        };
    }

    pub fn struct1(s1_int: i32, s1_string: &str, s1_bool: bool) -> Struct1 {
        Struct1 {
            s1_int,
            s1_string: s1_string.into(),
            s1_bool,
        }
    }

    pub fn default_struct_ptr() -> StructPtr {
        StructPtr {
            ptr_struct1: Some(struct1(11, "oui", true)),
            ptr_struct2: Some(Struct2 {
                s2_int64: 42,
                s2_string: "okay".into(),
                s2_bool: false,
                inner: Some(struct1(7, "inner", true)),
            }),
        }
    }

    // -- Fixtures for catalog errors -------------------------------------------

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
    pub struct Clash {
        pub port: u32,
        pub other_port: u32,
    }

    impl Flags for Clash {
        const META: Meta = Meta {
            name: "Clash",
            fields: &[
                Field::new("port", FieldKind::Leaf(SemanticType::U32)).describe("Port"),
                Field::new("other_port", FieldKind::Leaf(SemanticType::U32))
                    .describe("Other port")
                    .long("PORT"),
            ],
        };
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
    pub struct Hidden {
        pub visible: String,
        #[serde(skip)]
        pub secret: String,
    }

    impl Flags for Hidden {
        const META: Meta = Meta {
            name: "Hidden",
            fields: &[
                Field::new("visible", FieldKind::Leaf(SemanticType::String)).describe("Visible"),
                Field::new("secret", FieldKind::Leaf(SemanticType::String)).describe("Secret"),
            ],
        };
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
    pub struct HiddenHolder {
        pub hidden: Option<Hidden>,
    }

    impl Flags for HiddenHolder {
        const META: Meta = Meta {
            name: "HiddenHolder",
            fields: &[
                Field::new("hidden", FieldKind::Optional(Pointee::Nested(&Hidden::META)))
                    .describe("Enable hidden"),
            ],
        };
    }

    /// Plain nested section next to an optional one.
    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
    pub struct Sectioned {
        pub verbose: bool,
        pub server: ServerInfo,
        pub tags: Vec<String>,
    }

    impl Flags for Sectioned {
        const META: Meta = Meta {
            name: "Sectioned",
            fields: &[
                Field::new("verbose", FieldKind::Leaf(SemanticType::Bool))
                    .describe("Verbose output")
                    .short('v'),
                Field::new("server", FieldKind::Nested(&ServerInfo::META))
                    .describe("Server settings"),
                Field::new("tags", FieldKind::Leaf(SemanticType::StringList)).describe("Tags"),
            ],
        };
    }

    #[test]
    fn fixtures_serialize_absent_optionals_as_null() {
        let value = serde_json::to_value(initial_configuration()).unwrap();
        assert!(value["db"].is_null());
        assert_eq!(value["owner"]["name"], "InitOwnerNamePointer");
    }

    #[test]
    fn embedded_fields_share_parent_record() {
        let value = serde_json::to_value(default_configuration()).unwrap();
        assert_eq!(value["db"]["ip"], "192.168.1.2");
        assert_eq!(value["db"]["connection_max"], 3_200_000_000u64);
    }
}
