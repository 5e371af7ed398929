#[path = "../common/mod.rs"]
mod common;

use common::{assert_parses, mysql, postgres};
use insta::assert_snapshot;
use quarry::prelude::*;

#[test]
fn test_select_all_joins_foreign_fields() {
    let compiled = mysql().build_select("Lead", &SelectParams::new(), false).unwrap();

    assert_snapshot!(compiled.sql, @"SELECT lead.id AS `id`, lead.name AS `name`, lead.deleted AS `deleted`, lead.status AS `status`, lead.priority AS `priority`, lead.amount AS `amount`, lead.created_at AS `createdAt`, lead.assigned_user_id AS `assignedUserId`, TRIM(CONCAT(assignedUser.first_name, ' ', assignedUser.last_name)) AS `assignedUserName` FROM `lead` LEFT JOIN `user` AS `assignedUser` ON lead.assigned_user_id = assignedUser.id WHERE lead.deleted = '0'");
    assert!(compiled.diagnostics.is_empty());
    assert_parses(&compiled.sql, Dialect::MySql);
}

#[test]
fn test_explicit_select_without_foreign_fields_has_no_joins() {
    let params = SelectParams::new().select(["id", "name"]);
    let compiled = mysql().build_select("Lead", &params, false).unwrap();

    assert_snapshot!(compiled.sql, @"SELECT lead.id AS `id`, lead.name AS `name` FROM `lead` WHERE lead.deleted = '0'");
}

#[test]
fn test_foreign_field_with_pagination() {
    let params = SelectParams::new()
        .select(["name", "assignedUserName"])
        .offset(20)
        .limit(10);

    let my = mysql().build_select("Lead", &params, false).unwrap();
    assert_snapshot!(my.sql, @"SELECT lead.name AS `name`, TRIM(CONCAT(assignedUser.first_name, ' ', assignedUser.last_name)) AS `assignedUserName` FROM `lead` LEFT JOIN `user` AS `assignedUser` ON lead.assigned_user_id = assignedUser.id WHERE lead.deleted = '0' LIMIT 20, 10");
    assert_parses(&my.sql, Dialect::MySql);

    let pg = postgres().build_select("Lead", &params, false).unwrap();
    assert_snapshot!(pg.sql, @r#"SELECT lead.name AS "name", TRIM(CONCAT(assignedUser.first_name, ' ', assignedUser.last_name)) AS "assignedUserName" FROM "lead" LEFT JOIN "user" AS assignedUser ON lead.assigned_user_id = assignedUser.id WHERE lead.deleted = '0' LIMIT 10 OFFSET 20"#);
    assert_parses(&pg.sql, Dialect::Postgres);
}

#[test]
fn test_limit_without_offset_starts_at_zero() {
    let params = SelectParams::new().select(["id"]).limit(5);
    let compiled = mysql().build_select("Lead", &params, false).unwrap();
    assert!(compiled.sql.ends_with(" LIMIT 0, 5"), "{}", compiled.sql);
}

#[test]
fn test_offset_without_limit_is_ignored() {
    let params = SelectParams::new().select(["id"]).offset(40);
    let compiled = mysql().build_select("Lead", &params, false).unwrap();
    assert!(!compiled.sql.contains("LIMIT"), "{}", compiled.sql);
}

#[test]
fn test_select_template_replaces_column() {
    let params = SelectParams::new().select(["id", "name"]);
    let compiled = mysql().build_select("Contact", &params, false).unwrap();

    assert_snapshot!(compiled.sql, @"SELECT contact.id AS `id`, TRIM(CONCAT(contact.first_name, ' ', contact.last_name)) AS `name` FROM `contact` WHERE contact.deleted = '0'");
}

#[test]
fn test_unknown_select_field_dropped_with_diagnostic() {
    let params = SelectParams::new().select(["id", "bogus"]);
    let compiled = mysql().build_select("Lead", &params, false).unwrap();

    assert_eq!(compiled.sql, "SELECT lead.id AS `id` FROM `lead` WHERE lead.deleted = '0'");
    assert_eq!(
        compiled.diagnostics,
        vec![Diagnostic::DroppedSelectField {
            field: "bogus".into()
        }]
    );
}

#[test]
fn test_not_storable_field_skipped_silently() {
    let params = SelectParams::new().select(["id", "isFresh"]);
    let compiled = mysql().build_select("Lead", &params, false).unwrap();

    assert_eq!(compiled.sql, "SELECT lead.id AS `id` FROM `lead` WHERE lead.deleted = '0'");
    assert!(compiled.diagnostics.is_empty());
}

#[test]
fn test_relation_path_in_select() {
    let params = SelectParams::new()
        .select(["id", "assignedUser.userName"])
        .left_join("assignedUser");
    let compiled = mysql().build_select("Lead", &params, false).unwrap();

    assert_snapshot!(compiled.sql, @"SELECT lead.id AS `id`, assignedUser.user_name AS `assignedUser.userName` FROM `lead` LEFT JOIN `user` AS `assignedUser` ON lead.assigned_user_id = assignedUser.id WHERE lead.deleted = '0'");
}

#[test]
fn test_order_by_field_template() {
    let params = SelectParams::new()
        .select(["id"])
        .order_by("name")
        .order(SortDir::Desc);
    let compiled = mysql().build_select("Contact", &params, false).unwrap();

    assert_snapshot!(compiled.sql, @"SELECT contact.id AS `id` FROM `contact` WHERE contact.deleted = '0' ORDER BY contact.first_name DESC, contact.last_name DESC");
}

#[test]
fn test_order_by_foreign_field_defaults_to_ascending() {
    let params = SelectParams::new()
        .select(["id", "assignedUserName"])
        .order_by("assignedUserName");
    let compiled = mysql().build_select("Lead", &params, false).unwrap();

    assert!(
        compiled
            .sql
            .ends_with("ORDER BY TRIM(CONCAT(assignedUser.first_name, ' ', assignedUser.last_name)) ASC"),
        "{}",
        compiled.sql
    );
}

#[test]
fn test_order_by_position() {
    let params = SelectParams::new()
        .select(["id", "name"])
        .order_by(2u32)
        .order(SortDir::Desc);
    let compiled = mysql().build_select("Lead", &params, false).unwrap();
    assert!(compiled.sql.ends_with("ORDER BY 2 DESC"), "{}", compiled.sql);
}

#[test]
fn test_order_by_value_list() {
    let params = SelectParams::new()
        .select(["id"])
        .order_by("LIST:status:New,Assigned,In Process")
        .order(SortDir::Desc);

    let my = mysql().build_select("Lead", &params, false).unwrap();
    assert_snapshot!(my.sql, @"SELECT lead.id AS `id` FROM `lead` WHERE lead.deleted = '0' ORDER BY FIELD(lead.status, 'New', 'Assigned', 'In Process') DESC");
    assert_parses(&my.sql, Dialect::MySql);

    let pg = postgres().build_select("Lead", &params, false).unwrap();
    assert_snapshot!(pg.sql, @r#"SELECT lead.id AS "id" FROM "lead" WHERE lead.deleted = '0' ORDER BY CASE lead.status WHEN 'New' THEN 1 WHEN 'Assigned' THEN 2 WHEN 'In Process' THEN 3 ELSE 0 END DESC"#);
    assert_parses(&pg.sql, Dialect::Postgres);
}

#[test]
fn test_order_by_value_list_defaults_to_ascending() {
    let params = SelectParams::new()
        .select(["id"])
        .order_by("LIST:priority:High,Medium,Low");
    let compiled = mysql().build_select("Lead", &params, false).unwrap();
    assert!(
        compiled
            .sql
            .ends_with("ORDER BY FIELD(lead.priority, 'High', 'Medium', 'Low') ASC"),
        "{}",
        compiled.sql
    );
}

#[test]
fn test_order_by_multiple_terms() {
    let params = SelectParams::new().select(["id"]).order_by(vec![
        OrderTerm::new("status", None),
        OrderTerm::new("createdAt", Some(SortDir::Desc)),
    ]);
    let compiled = mysql().build_select("Lead", &params, false).unwrap();
    assert!(
        compiled.sql.ends_with("ORDER BY lead.status ASC, lead.created_at DESC"),
        "{}",
        compiled.sql
    );
}

#[test]
fn test_unknown_order_field_omits_order_by() {
    let params = SelectParams::new().select(["id"]).order_by("rank");
    let compiled = mysql().build_select("Lead", &params, false).unwrap();

    assert!(!compiled.sql.contains("ORDER BY"), "{}", compiled.sql);
    assert_eq!(
        compiled.diagnostics,
        vec![Diagnostic::UnknownOrderField { field: "rank".into() }]
    );
}

#[test]
fn test_include_deleted_drops_soft_delete_filter() {
    let params = SelectParams::new().select(["id"]);
    let compiled = mysql().build_select("Lead", &params, true).unwrap();
    assert_eq!(compiled.sql, "SELECT lead.id AS `id` FROM `lead`");
}

#[test]
fn test_caller_deleted_condition_wins() {
    let params = SelectParams::new()
        .select(["id"])
        .filter(WhereClause::new().with("deleted", 1));
    let compiled = mysql().build_select("Lead", &params, false).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT lead.id AS `id` FROM `lead` WHERE lead.deleted = '1'"
    );
}

#[test]
fn test_custom_join_and_where_follow_compiled_parts() {
    let params = SelectParams::new()
        .select(["id"])
        .custom_join("JOIN `lead_tag` AS tag ON tag.lead_id = lead.id")
        .custom_where("AND tag.name = 'hot'");
    let compiled = mysql().build_select("Lead", &params, false).unwrap();

    assert_snapshot!(compiled.sql, @"SELECT lead.id AS `id` FROM `lead` JOIN `lead_tag` AS tag ON tag.lead_id = lead.id WHERE lead.deleted = '0' AND tag.name = 'hot'");
    assert_parses(&compiled.sql, Dialect::MySql);
}

#[test]
fn test_distinct_groups_by_id() {
    let params = SelectParams::new().select(["id"]).distinct();
    let compiled = mysql().build_select("Lead", &params, false).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT lead.id AS `id` FROM `lead` WHERE lead.deleted = '0' GROUP BY `lead`.id"
    );
}

#[test]
fn test_additional_columns_from_join_table() {
    let params = SelectParams::new()
        .select(["id", "name"])
        .relation_name("leadTeam")
        .additional_column("role", "teamRole");
    let compiled = mysql().build_select("Team", &params, false).unwrap();

    assert_snapshot!(compiled.sql, @"SELECT team.id AS `id`, team.name AS `name`, `lead_team`.role AS `teamRole` FROM `team` WHERE team.deleted = '0'");
}

#[test]
fn test_additional_columns_need_relation_name() {
    let params = SelectParams::new()
        .select(["id"])
        .additional_column("role", "teamRole");
    let compiled = mysql().build_select("Team", &params, false).unwrap();
    assert!(!compiled.sql.contains("teamRole"), "{}", compiled.sql);
}

#[test]
fn test_unknown_entity() {
    let err = mysql()
        .build_select("Ghost", &SelectParams::new(), false)
        .unwrap_err();
    assert!(matches!(err, CompileError::UnknownEntity(name) if name == "Ghost"));
}

#[test]
fn test_params_from_json_document() {
    let params: SelectParams = serde_json::from_str(
        r#"{
            "select": ["id", "status"],
            "whereClause": { "status": ["New", "Assigned"], "amount>=": 1000 },
            "orderBy": "createdAt",
            "order": "desc",
            "offset": 0,
            "limit": 20,
            "joins": null
        }"#,
    )
    .unwrap();
    let compiled = mysql().build_select("Lead", &params, false).unwrap();

    assert_snapshot!(compiled.sql, @"SELECT lead.id AS `id`, lead.status AS `status` FROM `lead` WHERE lead.deleted = '0' AND lead.status IN ('New','Assigned') AND lead.amount >= '1000' ORDER BY lead.created_at DESC LIMIT 0, 20");
    assert_parses(&compiled.sql, Dialect::MySql);
}

#[test]
fn test_strict_mode_rejects_dropped_field() {
    use std::sync::Arc;

    let compiler = QueryCompiler::new(
        Arc::new(common::crm()),
        CompileOptions::default().with_strict(true),
    );
    let params = SelectParams::new().select(["id", "bogus"]);
    let err = compiler.build_select("Lead", &params, false).unwrap_err();
    assert!(matches!(err, CompileError::Strict(d) if d.len() == 1));
}
