//! Serializer output and round trips.

use std::collections::BTreeMap;
use std::time::Duration;

use inibind::{MapEnv, Parser, Record, SerializeError, SerializeOptions};

#[derive(Debug, Default, PartialEq, Record)]
struct Config {
    name: String,
    port: u16,
    tags: Vec<String>,
    motd: String,
    nickname: Option<String>,
    timeout: Duration,
    #[ini(flatten)]
    meta: Meta,
    server: Server,
    cache: Option<Cache>,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Meta {
    owner: String,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Server {
    host: String,
    tls: Option<Tls>,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Tls {
    cert: String,
    verify: bool,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Cache {
    size: u32,
    #[ini(key = "ttl")]
    time_to_live: Option<u32>,
    disk: Option<Disk>,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Disk {
    path: String,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Tagged {
    #[ini(key = "MaxConns")]
    max_conns: u32,
    #[ini(key = "Upstream")]
    upstream: Upstream,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Upstream {
    #[ini(key = "HostName")]
    host: String,
}

fn sample() -> Config {
    Config {
        name: "demo".into(),
        port: 8080,
        tags: vec!["a".into(), "b".into(), "c".into()],
        motd: "hello\nworld".into(),
        nickname: None,
        timeout: Duration::from_secs(90),
        meta: Meta {
            owner: "ops".into(),
        },
        server: Server {
            host: "example.com".into(),
            tls: Some(Tls {
                cert: "/etc/cert.pem".into(),
                verify: true,
            }),
        },
        cache: None,
    }
}

fn reparse(text: &str) -> Config {
    let mut config = Config::default();
    Parser::new()
        .env(MapEnv::new())
        .parse(text, &mut config)
        .unwrap();
    config
}

#[test]
fn test_serialize_document() {
    let text = inibind::to_string(&sample()).unwrap();
    insta::assert_snapshot!(text.trim_end(), @r"
    name = demo
    port = 8080
    tags = a
        b
        c
    motd = hello
        world
    nickname =
    timeout = 1m30s
    owner = ops

    [server]
    host = example.com

    [server.tls]
    cert = /etc/cert.pem
    verify = true

    ; [cache]
    ; size =
    ; ttl =

    ; [cache.disk]
    ; path =
    ");
}

#[test]
fn test_present_optional_section() {
    let mut config = sample();
    config.server.tls = None;
    config.cache = Some(Cache {
        size: 16,
        time_to_live: Some(60),
        disk: None,
    });

    let text = inibind::to_string(&config).unwrap();
    assert!(text.contains("\n; [server.tls]\n; cert =\n; verify =\n"), "{text}");
    assert!(text.contains("\n[cache]\nsize = 16\nttl = 60\n\n; [cache.disk]\n; path =\n"), "{text}");
}

#[test]
fn test_round_trip() {
    let original = sample();
    let text = inibind::to_string(&original).unwrap();
    assert_eq!(reparse(&text), original);

    let mut with_cache = sample();
    with_cache.cache = Some(Cache {
        size: 1,
        time_to_live: None,
        disk: Some(Disk {
            path: "/var/cache".into(),
        }),
    });
    let text = inibind::to_string(&with_cache).unwrap();
    assert_eq!(reparse(&text), with_cache);
}

#[test]
fn test_explicit_keys_keep_their_case() {
    let tagged = Tagged {
        max_conns: 5,
        upstream: Upstream {
            host: "db".into(),
        },
    };
    let text = inibind::to_string(&tagged).unwrap();
    assert_eq!(text, "MaxConns = 5\n\n[Upstream]\nHostName = db\n");

    let parsed: Tagged = inibind::from_str(&text).unwrap();
    assert_eq!(parsed, tagged);
}

#[test]
fn test_commented_template_parses_to_nothing() {
    let mut config = sample();
    config.server.tls = None;
    let text = inibind::to_string(&config).unwrap();
    let parsed = reparse(&text);
    assert_eq!(parsed.server.tls, None);
    assert_eq!(parsed.cache, None);
}

#[test]
fn test_custom_options() {
    let options = SerializeOptions::new().delimiter(":").indent("\t");
    let config = Config {
        tags: vec!["x".into(), "y".into()],
        ..Config::default()
    };
    let text = inibind::to_string_with_options(&config, &options).unwrap();
    assert!(text.starts_with("name :\nport : 0\ntags : x\n\ty\n"), "{text}");

    let mut parsed = Config::default();
    inibind::parse_with_delimiter(&text, &mut parsed, ":").unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_empty_delimiter() {
    let options = SerializeOptions::new().delimiter("");
    assert!(matches!(
        inibind::to_string_with_options(&sample(), &options),
        Err(SerializeError::InvalidDelimiter)
    ));
}

#[test]
fn test_to_writer() {
    let mut out = Vec::new();
    inibind::to_writer(&mut out, &Meta { owner: "me".into() }).unwrap();
    assert_eq!(out, b"owner = me\n");
}

#[derive(Debug, Default, Record)]
struct WithMap {
    name: String,
    labels: BTreeMap<String, String>,
}

#[derive(Debug, Default, Record)]
struct WithOptionalMap {
    inner: Option<MapHolder>,
}

#[derive(Debug, Default, Record)]
struct MapHolder {
    labels: Option<BTreeMap<String, String>>,
}

#[test]
fn test_unsupported_field_aborts() {
    let err = inibind::to_string(&WithMap::default()).unwrap_err();
    assert!(matches!(
        &err,
        SerializeError::Unsupported { key, .. } if key == "labels"
    ));

    // Absent sections are still checked.
    let mut out = Vec::new();
    let err = inibind::to_writer(&mut out, &WithOptionalMap::default()).unwrap_err();
    assert!(matches!(err, SerializeError::Unsupported { .. }));
    assert!(out.is_empty());
}

#[derive(Debug, Default, PartialEq)]
struct Secret(String);

impl inibind::TextDecode for Secret {
    fn from_text(text: &str) -> Result<Self, inibind::DecodeError> {
        Ok(Secret(text.to_string()))
    }
}

inibind::text_field!(Secret);

#[derive(Debug, Default, Record)]
struct Credentials {
    user: String,
    password: Secret,
}

#[test]
fn test_write_only_type_is_unencodable() {
    let mut creds = Credentials::default();
    inibind::parse("user = u\npassword = hunter2", &mut creds).unwrap();
    assert_eq!(creds.password, Secret("hunter2".into()));

    let err = inibind::to_string(&creds).unwrap_err();
    assert_eq!(
        err.to_string(),
        "field 'password' of type value has no text encoding"
    );
}
