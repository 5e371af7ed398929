//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use quarry::metadata::EntityRegistry;
use quarry::{CompileOptions, Dialect, QueryCompiler};
use sqlparser::dialect::{MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

/// A small CRM: leads, contacts, accounts and what they point at.
pub const CRM_JSON: &str = r#"{
  "Lead": {
    "fields": {
      "id": { "type": "id" },
      "name": { "type": "varchar" },
      "deleted": { "type": "bool" },
      "status": { "type": "enum" },
      "priority": { "type": "enum" },
      "amount": { "type": "currency" },
      "createdAt": { "type": "datetime" },
      "assignedUserId": { "type": "foreignId" },
      "assignedUserName": {
        "type": "foreign",
        "relation": "assignedUser",
        "foreign": ["firstName", " ", "lastName"]
      },
      "isFresh": { "type": "bool", "notStorable": true }
    },
    "relations": {
      "assignedUser": { "type": "belongsTo", "entity": "User" },
      "teams": {
        "type": "manyMany",
        "entity": "Team",
        "relationName": "EntityTeam",
        "midKeys": ["entityId", "teamId"],
        "conditions": { "entityType": "Lead" }
      },
      "opportunities": { "type": "hasMany", "entity": "Opportunity" }
    }
  },
  "Contact": {
    "fields": {
      "id": {},
      "name": {
        "select": "TRIM(CONCAT(contact.first_name, ' ', contact.last_name))",
        "orderBy": "contact.first_name {direction}, contact.last_name {direction}"
      },
      "firstName": {},
      "lastName": {},
      "deleted": {},
      "emailAddress": {
        "notStorable": true,
        "where": {
          "=": "contact.id IN (SELECT entity_id FROM entity_email_address WHERE email_address = {value})",
          "LIKE": "contact.id IN (SELECT entity_id FROM entity_email_address WHERE email_address LIKE {value})"
        }
      },
      "accountId": {},
      "accountName": { "type": "foreign", "relation": "account", "foreign": "name" }
    },
    "relations": {
      "account": { "type": "belongsTo", "entity": "Account" },
      "teams": {
        "type": "manyMany",
        "entity": "Team",
        "relationName": "ContactTeam",
        "midKeys": ["contactId", "teamId"]
      },
      "notes": { "type": "hasChildren", "entity": "Note" }
    }
  },
  "Account": {
    "fields": {
      "id": {},
      "name": {},
      "deleted": {},
      "parentId": {},
      "parentName": { "type": "foreign", "relation": "parent", "foreign": "name" }
    },
    "relations": {
      "parent": { "type": "belongsTo", "entity": "Account", "key": "parentId" },
      "contacts": { "type": "hasMany", "entity": "Contact" },
      "opportunities": { "type": "hasMany", "entity": "Opportunity" }
    }
  },
  "Opportunity": {
    "fields": {
      "id": {},
      "name": {},
      "deleted": {},
      "amount": {},
      "stage": {},
      "closeDate": {},
      "accountId": {}
    },
    "relations": {
      "account": { "type": "belongsTo", "entity": "Account" }
    }
  },
  "Team": {
    "fields": { "id": {}, "name": {}, "deleted": {} }
  },
  "User": {
    "fields": { "id": {}, "userName": {}, "firstName": {}, "lastName": {}, "deleted": {} }
  },
  "Note": {
    "fields": { "id": {}, "post": {}, "deleted": {}, "parentId": {}, "parentType": {} }
  }
}"#;

pub fn crm() -> EntityRegistry {
    EntityRegistry::from_json_str(CRM_JSON).expect("fixture metadata parses")
}

pub fn compiler(dialect: Dialect) -> QueryCompiler {
    QueryCompiler::new(Arc::new(crm()), CompileOptions::default().with_dialect(dialect))
}

pub fn mysql() -> QueryCompiler {
    compiler(Dialect::MySql)
}

pub fn postgres() -> QueryCompiler {
    compiler(Dialect::Postgres)
}

/// Assert that `sql` is one statement the dialect's grammar accepts.
pub fn assert_parses(sql: &str, dialect: Dialect) {
    let result = match dialect {
        Dialect::MySql => Parser::parse_sql(&MySqlDialect {}, sql),
        Dialect::Postgres => Parser::parse_sql(&PostgreSqlDialect {}, sql),
    };
    match result {
        Ok(statements) => assert_eq!(statements.len(), 1, "expected one statement: {}", sql),
        Err(e) => panic!("{} rejected generated SQL: {}\n{}", dialect, e, sql),
    }
}
