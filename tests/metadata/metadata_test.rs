#[path = "../common/mod.rs"]
mod common;

use std::path::PathBuf;
use std::sync::Arc;

use quarry::metadata::MetadataError;
use quarry::prelude::*;

const CRM_TOML: &str = r#"
[Lead.fields.id]
[Lead.fields.name]
[Lead.fields.deleted]
[Lead.fields.status]
[Lead.fields.assignedUserId]

[Lead.fields.assignedUserName]
type = "foreign"
relation = "assignedUser"
foreign = ["firstName", " ", "lastName"]

[Lead.relations.assignedUser]
type = "belongsTo"
entity = "User"

[Lead.relations.teams]
type = "manyMany"
entity = "Team"
relationName = "EntityTeam"
midKeys = ["entityId", "teamId"]
conditions = { entityType = "Lead" }

[User.fields.id]
[User.fields.firstName]
[User.fields.lastName]
"#;

fn temp_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("quarry-{}-{}", std::process::id(), name));
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_json_registry_keeps_declaration_order() {
    let registry = common::crm();
    assert_eq!(registry.len(), 7);
    assert_eq!(
        registry.entity_types(),
        ["Lead", "Contact", "Account", "Opportunity", "Team", "User", "Note"]
    );

    let lead = registry.entity("Lead").unwrap();
    assert_eq!(lead.name, "Lead");
    let fields: Vec<&str> = lead.fields.keys().map(String::as_str).collect();
    assert_eq!(fields[..3], ["id", "name", "deleted"]);
}

#[test]
fn test_field_kinds_from_json() {
    let registry = common::crm();
    let lead = registry.entity("Lead").unwrap();

    assert_eq!(lead.field("status").unwrap().kind, FieldKind::Column);
    assert!(!lead.field("isFresh").unwrap().is_storable());
    assert_eq!(
        lead.field("assignedUserName").unwrap().kind,
        FieldKind::Foreign {
            relation: "assignedUser".into(),
            foreign: ForeignColumn::Concat(vec!["firstName".into(), " ".into(), "lastName".into()]),
        }
    );

    let contact = registry.entity("Contact").unwrap();
    assert_eq!(contact.field("accountName").unwrap().foreign_relation(), Some("account"));
    assert!(contact.field("emailAddress").unwrap().where_template("LIKE").is_some());
    assert!(contact.field("emailAddress").unwrap().where_template("<>").is_none());
}

#[test]
fn test_relation_kinds_from_json() {
    let registry = common::crm();
    let contact = registry.entity("Contact").unwrap();

    assert_eq!(contact.relation("account").unwrap().kind, RelationKind::BelongsTo);
    assert_eq!(contact.relation("notes").unwrap().kind, RelationKind::HasChildren);

    let teams = contact.relation("teams").unwrap();
    assert_eq!(teams.kind, RelationKind::ManyMany);
    assert_eq!(teams.relation_name.as_deref(), Some("ContactTeam"));
    assert_eq!(teams.mid_keys, Some(("contactId".into(), "teamId".into())));
}

#[test]
fn test_toml_registry() {
    let registry = EntityRegistry::from_toml_str(CRM_TOML).unwrap();
    assert_eq!(registry.entity_types(), ["Lead", "User"]);

    let teams = registry.entity("Lead").unwrap().relation("teams").cloned().unwrap();
    assert_eq!(teams.mid_keys, Some(("entityId".into(), "teamId".into())));
    assert_eq!(teams.conditions.get("entityType"), Some(&Value::Text("Lead".into())));
}

#[test]
fn test_toml_and_json_compile_alike() {
    let params = SelectParams::new()
        .select(["id", "assignedUserName"])
        .join("teams")
        .filter(WhereClause::new().with("status", "New"));

    let from_toml = QueryCompiler::new(
        Arc::new(EntityRegistry::from_toml_str(CRM_TOML).unwrap()),
        CompileOptions::default(),
    )
    .build_select("Lead", &params, false)
    .unwrap();
    let from_json = common::mysql().build_select("Lead", &params, false).unwrap();

    assert_eq!(from_toml.sql, from_json.sql);
}

#[test]
fn test_from_file_dispatches_on_extension() {
    let json = temp_file("crm.json", common::CRM_JSON);
    let toml = temp_file("crm.toml", CRM_TOML);

    assert_eq!(EntityRegistry::from_file(&json).unwrap().len(), 7);
    assert_eq!(EntityRegistry::from_file(&toml).unwrap().len(), 2);

    std::fs::remove_file(json).ok();
    std::fs::remove_file(toml).ok();
}

#[test]
fn test_from_file_errors() {
    let yaml = temp_file("crm.yaml", "Lead: {}");
    assert!(matches!(
        EntityRegistry::from_file(&yaml),
        Err(MetadataError::UnsupportedFormat(_))
    ));
    std::fs::remove_file(yaml).ok();

    assert!(matches!(
        EntityRegistry::from_file("/nonexistent/quarry/crm.json"),
        Err(MetadataError::Io(_))
    ));

    let broken = temp_file("broken.json", "{ \"Lead\": ");
    assert!(matches!(EntityRegistry::from_file(&broken), Err(MetadataError::Json(_))));
    std::fs::remove_file(broken).ok();
}

#[test]
fn test_invalid_foreign_field_is_reported() {
    let err = EntityRegistry::from_json_str(
        r#"{ "Lead": { "fields": { "ownerName": { "type": "foreign", "foreign": "name" } } } }"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("requires `relation`"), "{}", err);

    let err = EntityRegistry::from_toml_str(
        "[Lead.fields.ownerName]\ntype = \"foreign\"\nrelation = \"owner\"\n",
    )
    .unwrap_err();
    assert!(matches!(err, MetadataError::Toml(_)));
}

#[test]
fn test_unknown_relation_kind_rejected() {
    let err = EntityRegistry::from_json_str(
        r#"{ "Lead": { "relations": { "owner": { "type": "hasOne", "entity": "User" } } } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, MetadataError::Json(_)));
}
