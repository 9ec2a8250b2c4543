use reportflow::dataset::{
    DatasetDefinition, DatasetError, DatasetId, DatasetRepository, InMemoryRepository, Params,
};
use reportflow::sql::template::has_placeholders;
use reportflow::sql::{resolve, DepthGuard, TemplateResolver, UnresolvedReason};
use serde_json::{json, Value};

fn dataset(id: DatasetId, sql: &str) -> DatasetDefinition {
    DatasetDefinition {
        id,
        name: format!("dataset_{id}"),
        datasource: "warehouse".to_string(),
        sql: sql.to_string(),
        params: vec![],
    }
}

fn params(value: Value) -> Params {
    value.as_object().cloned().unwrap_or_default()
}

/// Dataset `n` selects from dataset `n + 1`, down to `len`, which reads a table.
fn chain(len: DatasetId) -> InMemoryRepository {
    (1..=len)
        .map(|id| {
            if id == len {
                dataset(id, "SELECT * FROM base")
            } else {
                dataset(id, &format!("SELECT * FROM {{{{dataset:{}}}}}", id + 1))
            }
        })
        .collect()
}

struct BrokenRepository;

impl DatasetRepository for BrokenRepository {
    fn dataset(&self, _id: DatasetId) -> Result<Option<DatasetDefinition>, DatasetError> {
        Err(DatasetError::Unavailable("metadata store offline".to_string()))
    }
}

#[test]
fn test_chain_within_depth_expands_fully() {
    let repo = chain(5);
    let resolved = TemplateResolver::new(&repo).resolve("{{dataset:1}}", &Params::new());

    assert_eq!(
        resolved.sql,
        "(SELECT * FROM (SELECT * FROM (SELECT * FROM (SELECT * FROM (SELECT * FROM base)))))"
    );
    assert_eq!(resolved.depth, 5);
    assert!(resolved.is_complete());
    assert!(!has_placeholders(&resolved.sql));
}

#[test]
fn test_chain_beyond_depth_is_truncated() {
    let repo = chain(7);
    let resolved = TemplateResolver::new(&repo).resolve("{{dataset:1}}", &Params::new());

    assert_eq!(resolved.depth, 5);
    assert_eq!(resolved.unresolved.len(), 1);
    assert_eq!(resolved.unresolved[0].id, "7");
    assert_eq!(resolved.unresolved[0].depth, 6);
    assert_eq!(resolved.unresolved[0].reason, UnresolvedReason::DepthExceeded);
    assert!(resolved.sql.contains("{{dataset:7}}"));
    assert!(!resolved.sql.contains("base"));
}

#[test]
fn test_custom_guard() {
    let repo = chain(3);
    let shallow = resolve("{{dataset:1}}", &Params::new(), &repo, DepthGuard::new(1));
    assert_eq!(shallow.sql, "(SELECT * FROM (SELECT * FROM {{dataset:3}}))");

    let none = resolve("{{dataset:1}}", &Params::new(), &repo, DepthGuard::new(0));
    assert_eq!(none.sql, "(SELECT * FROM {{dataset:2}})");
    assert_eq!(none.depth, 0);
}

#[test]
fn test_params_reach_nested_datasets() {
    let repo = InMemoryRepository::new()
        .with(dataset(10, "SELECT * FROM orders WHERE year = {{param:year}}"))
        .with(dataset(
            11,
            "SELECT region, SUM(amount) AS total FROM {{ dataset:10 }} o \
             WHERE region IN ({{param:regions}}) GROUP BY region",
        ));

    let resolved = TemplateResolver::new(&repo).resolve(
        "SELECT * FROM {{dataset:11}} t",
        &params(json!({"year": 2024, "regions": ["North", "O'Hare"]})),
    );

    assert_eq!(
        resolved.sql,
        "SELECT * FROM (SELECT region, SUM(amount) AS total FROM \
         (SELECT * FROM orders WHERE year = 2024) o \
         WHERE region IN ('North','O''Hare') GROUP BY region) t"
    );
    assert_eq!(resolved.depth, 2);
}

#[test]
fn test_resolution_is_idempotent() {
    let repo = InMemoryRepository::new().with(dataset(2, "SELECT id FROM users WHERE active = {{param:active}}"));
    let params = params(json!({"active": 1}));
    let resolver = TemplateResolver::new(&repo);

    let once = resolver.resolve("SELECT * FROM {{dataset:2}} u", &params);
    let twice = resolver.resolve(&once.sql, &params);

    assert_eq!(once.sql, twice.sql);
    assert_eq!(twice.depth, 0);
}

#[test]
fn test_missing_and_null_params_render_empty() {
    let repo = InMemoryRepository::new();
    let resolved = TemplateResolver::new(&repo).resolve(
        "a = '{{param:missing}}' AND b = '{{param:nothing}}'",
        &params(json!({"nothing": null})),
    );
    assert_eq!(resolved.sql, "a = '' AND b = ''");
}

#[test]
fn test_scalar_strings_are_not_quoted() {
    let repo = InMemoryRepository::new();
    let resolved = TemplateResolver::new(&repo).resolve(
        "WHERE region = '{{param:region}}' AND n IN ({{param:ids}})",
        &params(json!({"region": "East", "ids": [1, 2.5, null]})),
    );
    assert_eq!(resolved.sql, "WHERE region = 'East' AND n IN (1,2.5,NULL)");
}

#[test]
fn test_malformed_placeholders_are_left_alone() {
    let repo = chain(1);
    let template = "SELECT '{{dataset:abc}}', '{{param:}}', '{dataset:1}'";
    let resolved = TemplateResolver::new(&repo).resolve(template, &Params::new());
    assert_eq!(resolved.sql, template);
    assert!(resolved.is_complete());
}

#[test]
fn test_lookup_failure_is_reported() {
    let resolved = TemplateResolver::new(&BrokenRepository).resolve("SELECT * FROM {{dataset:3}}", &Params::new());

    assert_eq!(resolved.sql, "SELECT * FROM {{dataset:3}}");
    match &resolved.unresolved[0].reason {
        UnresolvedReason::LookupFailed(message) => assert!(message.contains("offline")),
        other => panic!("expected lookup failure, got {other:?}"),
    }
}

#[test]
fn test_declared_defaults_fill_missing_params() {
    let mut definition = dataset(4, "SELECT * FROM t WHERE y = {{param:year}} AND r = '{{param:region}}'");
    definition.params = serde_json::from_value(json!([
        {"name": "year", "type": "int", "default": 2023},
        {"name": "region", "default": "All"}
    ]))
    .unwrap();

    let repo = InMemoryRepository::new().with(definition.clone());
    let effective = definition.effective_params(&params(json!({"region": "West"})));
    let resolved = TemplateResolver::new(&repo).resolve(&definition.sql, &effective);

    assert_eq!(resolved.sql, "SELECT * FROM t WHERE y = 2023 AND r = 'West'");
}
