use std::sync::Arc;

use wirebox::{instance, Container, FactoryKind, Module, Overrides, CONTAINER_MODULE};

#[derive(Debug, Clone, PartialEq)]
struct Config {
    dsn: String,
    pool_size: u32,
}

#[derive(Debug)]
struct Database {
    dsn: String,
}

#[derive(Debug)]
struct UserRepo {
    db: Arc<Database>,
}

#[derive(Debug)]
struct OrderRepo {
    db: Arc<Database>,
}

struct App {
    users: Arc<UserRepo>,
    orders: Arc<OrderRepo>,
}

fn wire() -> Container {
    let container = Container::new();
    container
        .register(
            "config",
            Module::constant(Config {
                dsn: "postgres://localhost".into(),
                pool_size: 4,
            }),
        )
        .unwrap();
    container
        .register(
            "database",
            Module::factory(&["config"], |args| {
                let config = args.get::<Config>(0)?;
                Ok(instance(Database { dsn: config.dsn.clone() }))
            }),
        )
        .unwrap();
    container
        .register(
            "user_repo",
            Module::factory(&["database"], |args| Ok(instance(UserRepo { db: args.get(0)? }))).tag("repo"),
        )
        .unwrap();
    container
        .register(
            "order_repo",
            Module::factory(&["database"], |args| Ok(instance(OrderRepo { db: args.get(0)? }))).tag("repo"),
        )
        .unwrap();
    container
        .register(
            "app",
            Module::factory(&["user_repo", "order_repo"], |args| {
                Ok(instance(App {
                    users: args.get(0)?,
                    orders: args.get(1)?,
                }))
            }),
        )
        .unwrap();
    container
}

#[test]
fn test_wires_an_application_graph() {
    let container = wire();

    let config = container.get_as::<Config>("config").unwrap();
    assert_eq!(config.pool_size, 4);

    let app = container.get_as::<App>("app").unwrap();
    assert_eq!(app.users.db.dsn, "postgres://localhost");
    // the shared database singleton flows into both repositories
    assert!(Arc::ptr_eq(&app.users.db, &app.orders.db));

    let again = container.get_as::<App>("app").unwrap();
    assert!(Arc::ptr_eq(&app, &again));
}

#[test]
fn test_swaps_a_subtree_for_one_call() {
    let container = wire();

    let overrides = Overrides::new().with(
        "database",
        Database {
            dsn: "sqlite::memory:".into(),
        },
    );
    let app = container.get_with("app", &overrides).unwrap().downcast::<App>().unwrap();
    assert_eq!(app.users.db.dsn, "sqlite::memory:");

    // the persistent graph is untouched
    let app = container.get_as::<App>("app").unwrap();
    assert_eq!(app.users.db.dsn, "postgres://localhost");
}

#[test]
fn test_groups_repositories_by_tag() {
    let container = wire();

    let repos = container.get_by_tag("repo").unwrap();
    assert_eq!(repos.keys().map(String::as_str).collect::<Vec<_>>(), ["order_repo", "user_repo"]);
    assert!(repos["user_repo"].clone().downcast::<UserRepo>().is_ok());
}

#[test]
fn test_introspection_view() {
    let container = wire();
    let _ = container.get("app").unwrap();

    let views = container.get_all();
    assert_eq!(views["config"].kind, FactoryKind::Constant);
    assert_eq!(views["app"].dependencies, ["user_repo", "order_repo"]);
    assert_eq!(views["app"].cache, Some(true));
    assert!(views["app"].has_cached_instance);
    assert_eq!(views[CONTAINER_MODULE].kind, FactoryKind::Artifact);
}

#[test]
fn test_replace_discards_only_its_own_cache() {
    let container = wire();

    let database = container.get_as::<Database>("database").unwrap();
    container
        .replace(
            "config",
            Module::constant(Config {
                dsn: "mysql://remote".into(),
                pool_size: 8,
            }),
        )
        .unwrap();

    // the database singleton built from the old config is still cached
    let cached = container.get_as::<Database>("database").unwrap();
    assert!(Arc::ptr_eq(&database, &cached));

    // a new dependent of `config` sees the replacement
    container
        .register(
            "health",
            Module::factory(&["config"], |args| Ok(instance(args.get::<Config>(0)?.dsn.clone()))),
        )
        .unwrap();
    assert_eq!(*container.get_as::<String>("health").unwrap(), "mysql://remote");
}
