//! `!include` handling.

use std::path::{Path, PathBuf};

use inibind::{ErrorKind, MapEnv, MemoryLoader, ParseOptions, Parser, Record};

#[derive(Debug, Default, PartialEq, Record)]
struct Config {
    name: String,
    port: u16,
    extra: String,
    db: Option<Database>,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Database {
    url: String,
    pool: u32,
}

fn parser(loader: MemoryLoader) -> Parser {
    Parser::new().loader(loader).env(MapEnv::new())
}

#[test]
fn test_include_applies_in_place() {
    let loader = MemoryLoader::new()
        .with_file("/etc/app/main.ini", "name = main\n!include conf.d/db.ini\nport = 80\n")
        .with_file("/etc/app/conf.d/db.ini", "[db]\nurl = postgres://db\npool = 4\n");

    let mut config = Config::default();
    parser(loader)
        .parse_file("/etc/app/main.ini", &mut config)
        .unwrap();

    assert_eq!(config.name, "main");
    // The section opened inside the include does not leak out of it.
    assert_eq!(config.port, 80);
    assert_eq!(
        config.db,
        Some(Database {
            url: "postgres://db".into(),
            pool: 4,
        })
    );
}

#[test]
fn test_include_is_applied_before_following_lines() {
    let loader = MemoryLoader::new()
        .with_file("/cfg/main.ini", "port = 1\n!include override.ini\nname = after\n")
        .with_file("/cfg/override.ini", "port = 2\nname = inner\n");

    let mut config = Config::default();
    parser(loader).parse_file("/cfg/main.ini", &mut config).unwrap();
    assert_eq!(config.port, 2);
    assert_eq!(config.name, "after");
}

#[test]
fn test_absolute_include_from_memory_input() {
    let loader = MemoryLoader::new().with_file("/shared/extra.ini", "extra = yes\n");
    let mut config = Config::default();
    parser(loader)
        .parse("name = root\n!include /shared/extra.ini\n", &mut config)
        .unwrap();
    assert_eq!(config.extra, "yes");
}

#[test]
fn test_relative_include_without_base() {
    let mut config = Config::default();
    let errors = parser(MemoryLoader::new())
        .parse("name = a\n!include extra.ini\nport = 2\n", &mut config)
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().line, Some(2));
    assert!(matches!(
        errors.first().kind,
        ErrorKind::IncludeWithoutBase { .. }
    ));
    assert_eq!(config.name, "a");
    assert_eq!(config.port, 2);
}

#[test]
fn test_missing_include_keeps_going() {
    let loader = MemoryLoader::new().with_file(
        "/cfg/main.ini",
        "name = before\n!include missing.ini\nport = 8080\n",
    );

    let mut config = Config::default();
    let errors = parser(loader)
        .parse_file("/cfg/main.ini", &mut config)
        .unwrap_err();

    assert_eq!(errors.len(), 1);
    let error = errors.first();
    assert_eq!(error.line, Some(2));
    assert_eq!(error.origin.as_deref(), Some(Path::new("/cfg/main.ini")));
    assert!(matches!(&error.kind, ErrorKind::IncludeOpen { path, .. } if path == Path::new("/cfg/missing.ini")));
    assert!(error.to_string().contains("missing.ini"), "{error}");

    assert_eq!(config.name, "before");
    assert_eq!(config.port, 8080);
}

#[test]
fn test_circular_include() {
    let loader = MemoryLoader::new()
        .with_file("/cfg/a.ini", "name = a\n!include b.ini\n")
        .with_file("/cfg/b.ini", "port = 2\n!include ./a.ini\n");

    let mut config = Config::default();
    let errors = parser(loader)
        .parse_file("/cfg/a.ini", &mut config)
        .unwrap_err();

    assert_eq!(errors.len(), 1);
    let error = errors.first();
    assert!(matches!(&error.kind, ErrorKind::CircularInclude { path } if path == Path::new("/cfg/a.ini")));
    assert_eq!(error.line, Some(2));
    assert_eq!(error.origin.as_deref(), Some(Path::new("/cfg/b.ini")));
    assert_eq!(config.name, "a");
    assert_eq!(config.port, 2);
}

#[test]
fn test_self_include() {
    let loader = MemoryLoader::new().with_file("/cfg/self.ini", "!include self.ini\n");
    let mut config = Config::default();
    let errors = parser(loader)
        .parse_file("/cfg/self.ini", &mut config)
        .unwrap_err();
    assert!(matches!(
        errors.first().kind,
        ErrorKind::CircularInclude { .. }
    ));
}

#[test]
fn test_memory_root_cycle() {
    let loader = MemoryLoader::new()
        .with_file("/cfg/a.ini", "!include b.ini\n")
        .with_file("/cfg/b.ini", "!include a.ini\n");
    let mut config = Config::default();
    let errors = parser(loader)
        .parse("!include /cfg/a.ini\n", &mut config)
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().origin.as_deref(), Some(Path::new("/cfg/b.ini")));
}

fn chain(len: usize) -> MemoryLoader {
    let mut loader = MemoryLoader::new();
    for i in 0..len {
        loader.insert(
            format!("/chain/{i}.ini"),
            format!("port = {i}\n!include {}.ini\n", i + 1),
        );
    }
    loader.insert(format!("/chain/{len}.ini"), "name = bottom\n");
    loader
}

#[test]
fn test_depth_limit() {
    // 0.ini includes 1.ini ... 10.ini: ten levels of nesting are allowed.
    let mut config = Config::default();
    parser(chain(10))
        .parse_file("/chain/0.ini", &mut config)
        .unwrap();
    assert_eq!(config.name, "bottom");

    // An eleventh level is not.
    let mut config = Config::default();
    let errors = parser(chain(11))
        .parse_file("/chain/0.ini", &mut config)
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    let error = errors.first();
    assert!(matches!(error.kind, ErrorKind::IncludeDepth { max: 10, .. }));
    assert_eq!(error.origin.as_deref(), Some(Path::new("/chain/10.ini")));
    assert_eq!(config.port, 10);
    assert_eq!(config.name, "");
}

#[test]
fn test_configurable_depth() {
    let mut config = Config::default();
    let errors = parser(chain(3))
        .options(ParseOptions::new().max_include_depth(2))
        .parse_file("/chain/0.ini", &mut config)
        .unwrap_err();
    assert!(matches!(
        errors.first().kind,
        ErrorKind::IncludeDepth { max: 2, .. }
    ));
    assert_eq!(config.port, 2);
}

#[test]
fn test_errors_inside_include_carry_origin() {
    let loader = MemoryLoader::new()
        .with_file("/cfg/main.ini", "name = ok\n!include bad.ini\nport = nope\n")
        .with_file("/cfg/bad.ini", "\n\nbogus = 1\n");

    let mut config = Config::default();
    let errors = parser(loader)
        .parse_file("/cfg/main.ini", &mut config)
        .unwrap_err();

    let located: Vec<_> = errors
        .iter()
        .map(|e| (e.origin.clone(), e.line))
        .collect();
    assert_eq!(
        located,
        [
            (Some(PathBuf::from("/cfg/bad.ini")), Some(3)),
            (Some(PathBuf::from("/cfg/main.ini")), Some(3)),
        ]
    );
    assert_eq!(
        errors.first().to_string(),
        "/cfg/bad.ini: error at line 3: no matching field found for key 'bogus'"
    );
}

#[test]
fn test_missing_root_file() {
    let mut config = Config::default();
    let errors = parser(MemoryLoader::new())
        .parse_file("/nowhere.ini", &mut config)
        .unwrap_err();
    assert!(matches!(errors.first().kind, ErrorKind::IncludeOpen { .. }));
    assert_eq!(errors.first().line, None);
}

#[test]
fn test_filesystem_includes() {
    let dir = std::env::temp_dir().join(format!("inibind-include-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("conf.d")).unwrap();
    std::fs::write(
        dir.join("main.ini"),
        "name = fs\n!include conf.d/db.ini\n!include conf.d/../main.ini\n",
    )
    .unwrap();
    std::fs::write(dir.join("conf.d/db.ini"), "[db]\npool = 9\n").unwrap();

    let mut config = Config::default();
    let result = inibind::parse_file(dir.join("main.ini"), &mut config);
    std::fs::remove_dir_all(&dir).unwrap();

    let errors = result.unwrap_err();
    assert_eq!(config.name, "fs");
    assert_eq!(config.db.map(|db| db.pool), Some(9));
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors.first().kind,
        ErrorKind::CircularInclude { .. }
    ));
}
