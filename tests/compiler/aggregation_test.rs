#[path = "../common/mod.rs"]
mod common;

use common::{assert_parses, mysql, postgres};
use insta::assert_snapshot;
use quarry::prelude::*;

#[test]
fn test_count_query() {
    let params = SelectParams::new().select(["id"]).aggregation("COUNT", "id");
    let compiled = mysql().build_select("Lead", &params, false).unwrap();

    assert_snapshot!(compiled.sql, @"SELECT COUNT(lead.id) AS AggregateValue FROM `lead` WHERE lead.deleted = '0'");
    assert_parses(&compiled.sql, Dialect::MySql);
}

#[test]
fn test_aggregation_ignores_order_and_pagination() {
    let params = SelectParams::new()
        .select(["id"])
        .aggregation("count", "id")
        .order_by("name")
        .group_by(["status"])
        .offset(10)
        .limit(10);
    let compiled = mysql().build_select("Lead", &params, false).unwrap();

    assert_eq!(
        compiled.sql,
        "SELECT COUNT(lead.id) AS AggregateValue FROM `lead` WHERE lead.deleted = '0'"
    );
}

#[test]
fn test_distinct_count() {
    let params = SelectParams::new()
        .select(["id"])
        .join("teams")
        .distinct()
        .aggregation("COUNT", "id");
    let compiled = mysql().build_select("Lead", &params, false).unwrap();

    assert!(compiled.sql.starts_with("SELECT COUNT(DISTINCT lead.id) AS AggregateValue FROM `lead` JOIN"), "{}", compiled.sql);
    assert!(!compiled.sql.contains("GROUP BY"), "{}", compiled.sql);
}

#[test]
fn test_sum_keeps_filters_and_joins() {
    let params = SelectParams::new()
        .select(["assignedUserName"])
        .filter(WhereClause::new().with("status", "Won"))
        .aggregation("SUM", "amount");
    let compiled = postgres().build_select("Lead", &params, false).unwrap();

    assert_snapshot!(compiled.sql, @r#"SELECT SUM(lead.amount) AS AggregateValue FROM "lead" LEFT JOIN "user" AS assignedUser ON lead.assigned_user_id = assignedUser.id WHERE lead.deleted = '0' AND lead.status = 'Won'"#);
    assert_parses(&compiled.sql, Dialect::Postgres);
}

#[test]
fn test_unknown_aggregation_field() {
    let params = SelectParams::new().aggregation("SUM", "revenue");
    let err = mysql().build_select("Lead", &params, false).unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnknownAggregationField { entity, field } if entity == "Lead" && field == "revenue"
    ));
}

#[test]
fn test_unsupported_aggregation_function() {
    let params = SelectParams::new().aggregation("();", "amount");
    let err = mysql().build_select("Lead", &params, false).unwrap_err();
    assert!(matches!(err, CompileError::UnsupportedAggregation(f) if f == "();"));
}

#[test]
fn test_grouped_report() {
    let params = SelectParams::new()
        .select(["status", "COUNT:id"])
        .group_by(["status"])
        .order_by(2u32)
        .order(SortDir::Desc);
    let compiled = mysql().build_select("Lead", &params, false).unwrap();

    assert_snapshot!(compiled.sql, @"SELECT lead.status AS `status`, COUNT(lead.id) AS `COUNT:id` FROM `lead` WHERE lead.deleted = '0' GROUP BY lead.status ORDER BY 2 DESC");
    assert_parses(&compiled.sql, Dialect::MySql);
}

#[test]
fn test_date_bucket_report() {
    let params = SelectParams::new()
        .select(["MONTH:createdAt", "SUM:amount"])
        .group_by(["MONTH:createdAt"]);

    let my = mysql().build_select("Lead", &params, false).unwrap();
    assert_snapshot!(my.sql, @"SELECT DATE_FORMAT(lead.created_at, '%Y-%m') AS `MONTH:createdAt`, SUM(lead.amount) AS `SUM:amount` FROM `lead` WHERE lead.deleted = '0' GROUP BY DATE_FORMAT(lead.created_at, '%Y-%m')");
    assert_parses(&my.sql, Dialect::MySql);

    let pg = postgres().build_select("Lead", &params, false).unwrap();
    assert_snapshot!(pg.sql, @r#"SELECT TO_CHAR(lead.created_at, 'YYYY-MM') AS "MONTH:createdAt", SUM(lead.amount) AS "SUM:amount" FROM "lead" WHERE lead.deleted = '0' GROUP BY TO_CHAR(lead.created_at, 'YYYY-MM')"#);
    assert_parses(&pg.sql, Dialect::Postgres);
}

#[test]
fn test_year_report_groups_by_plain_year() {
    let params = SelectParams::new()
        .select(["YEAR:createdAt", "COUNT:id"])
        .group_by(["YEAR:createdAt"]);

    let my = mysql().build_select("Lead", &params, false).unwrap();
    assert_snapshot!(my.sql, @"SELECT YEAR(lead.created_at) AS `YEAR:createdAt`, COUNT(lead.id) AS `COUNT:id` FROM `lead` WHERE lead.deleted = '0' GROUP BY YEAR(lead.created_at)");
    assert_parses(&my.sql, Dialect::MySql);
}

#[test]
fn test_distinct_sum_corrects_fan_out() {
    let params = SelectParams::new()
        .select(["status", "SUM:amount"])
        .join("teams")
        .distinct()
        .group_by(["status"]);
    let compiled = mysql().build_select("Lead", &params, false).unwrap();

    assert_snapshot!(compiled.sql, @"SELECT lead.status AS `status`, SUM(lead.amount) * COUNT(DISTINCT lead.id) / COUNT(lead.id) AS `SUM:amount` FROM `lead` JOIN `entity_team` AS `entityTeam` ON lead.id = entityTeam.entity_id AND entityTeam.deleted = '0' AND entityTeam.entity_type = 'Lead' JOIN `team` AS `teams` ON teams.id = entityTeam.team_id AND teams.deleted = '0' WHERE lead.deleted = '0' GROUP BY lead.status");
    assert_parses(&compiled.sql, Dialect::MySql);
}

#[test]
fn test_aggregate_over_relation() {
    let params = SelectParams::new()
        .select(["name", "SUM:opportunities.amount"])
        .left_join("opportunities")
        .group_by(["id", "name"]);
    let compiled = mysql().build_select("Account", &params, false).unwrap();

    assert_snapshot!(compiled.sql, @"SELECT account.name AS `name`, SUM(opportunities.amount) AS `SUM:opportunities.amount` FROM `account` LEFT JOIN `opportunity` AS `opportunities` ON account.id = opportunities.account_id AND opportunities.deleted = '0' WHERE account.deleted = '0' GROUP BY account.id, account.name");
    assert_parses(&compiled.sql, Dialect::MySql);
}
