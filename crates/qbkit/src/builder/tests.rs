use super::*;
use crate::condition::{ConditionNode, Connector, Group};
use crate::config::BuilderConfig;
use crate::error::QbError;
use std::sync::{Arc, Mutex};

// ==================== SELECT ====================

#[test]
fn test_select_example() {
    let sql = select("users")
        .alias("u")
        .columns(["id", "name"])
        .where_(["u.age > 18"])
        .order_by(["u.name"])
        .limit(10)
        .get_query()
        .unwrap()
        .to_string();
    assert_eq!(
        sql,
        "SELECT id,name FROM users u WHERE u.age > 18 ORDER BY u.name LIMIT 10"
    );
}

#[test]
fn test_simple_select() {
    let mut qb = SelectBuilder::new("users");
    assert_eq!(qb.get_query().unwrap(), "SELECT * FROM users");
}

#[test]
fn test_select_aliased_columns() {
    let mut qb = SelectBuilder::aliased("users", "u");
    qb.column("u.id")
        .column_as("u.name", "username")
        .column_as("u.email", "u.email");
    assert_eq!(
        qb.get_query().unwrap(),
        "SELECT u.id,u.name AS username,u.email FROM users u"
    );
}

#[test]
fn test_select_missing_table() {
    let mut qb = SelectBuilder::new("");
    assert!(matches!(qb.render(), Err(QbError::MissingTable("SELECT"))));
}

#[test]
fn test_get_query_is_cached_until_mutation() {
    let mut qb = SelectBuilder::new("users");
    qb.where_(["status = 'active'"]);

    let first = qb.get_query().unwrap().to_string();
    assert!(qb.is_rendered());
    let second = qb.get_query().unwrap().to_string();
    assert_eq!(first, second);

    qb.limit(5);
    assert!(!qb.is_rendered());
    assert_eq!(
        qb.get_query().unwrap(),
        "SELECT * FROM users WHERE status = 'active' LIMIT 5"
    );
}

#[test]
fn test_bind_invalidates_cache() {
    let mut qb = SelectBuilder::new("users");
    qb.get_query().unwrap();
    assert_eq!(qb.bind(7i32), 1);
    assert!(!qb.is_rendered());
    assert_eq!(qb.params().len(), 1);
}

#[test]
fn test_conditions_with_connectors() {
    let mut qb = SelectBuilder::new("users");
    qb.and_where(["a = 1"])
        .or_where(["b = 2", "c = 3"])
        .add_condition("d = 4", Connector::And)
        .add_condition("", Connector::Or);
    assert_eq!(
        qb.get_query().unwrap(),
        "SELECT * FROM users WHERE a = 1 OR b = 2 OR c = 3 AND d = 4"
    );

    qb.where_(["x = 1", "y = 2"]);
    assert_eq!(qb.get_query().unwrap(), "SELECT * FROM users WHERE x = 1 AND y = 2");

    qb.clear_conditions();
    assert_eq!(qb.get_query().unwrap(), "SELECT * FROM users");
}

#[test]
fn test_where_chain_with_group() {
    let chain = ConditionNode::new("status")
        .equals("'active'")
        .and(Group::new(
            ConditionNode::new("role").equals("'admin'").or("reputation > 100"),
        ));

    let mut qb = SelectBuilder::new("users");
    qb.where_chain(&chain);
    assert_eq!(
        qb.get_query().unwrap(),
        "SELECT * FROM users WHERE status = 'active' AND (role = 'admin' OR reputation > 100)"
    );
}

#[test]
fn test_and_where_in_uses_configured_limit() {
    let config = BuilderConfig::new().with_in_list_limit(2);
    let mut qb = SelectBuilder::with_config("users", &config);
    qb.and_where_in("id", [1, 2, 3])
        .and_where_between("age", "18", "30")
        .and_where_in("role_id", Vec::<i32>::new());
    assert_eq!(
        qb.get_query().unwrap(),
        "SELECT * FROM users WHERE (id IN(1,2) OR id IN(3)) AND age BETWEEN 18 AND 30"
    );
}

#[test]
fn test_join_and_subquery() {
    let mut orders = SelectBuilder::new("orders");
    orders.columns(["user_id"]).aggregate("sum", "total", "spent");

    let mut qb = SelectBuilder::aliased("users", "u");
    qb.columns(["u.id", "o.spent"])
        .left_join("roles", "r", "u.role_id = r.id")
        .inner_join(orders, "o", ConditionNode::new("o.user_id").equals("u.id"));

    assert_eq!(
        qb.get_query().unwrap(),
        "SELECT u.id,o.spent FROM users u \
         LEFT JOIN roles r ON u.role_id = r.id \
         INNER JOIN (SELECT user_id,SUM(total) AS spent FROM orders GROUP BY user_id) o ON o.user_id = u.id"
    );
}

#[test]
fn test_join_by_name_and_replace_alias() {
    let mut qb = SelectBuilder::aliased("users", "u");
    qb.join("left", "roles", "r", "u.role_id = r.id").unwrap();
    qb.join("natural", "profiles", "p", "ignored = 1").unwrap();
    qb.join("INNER", "roles_v2", "r", "u.role_id = r.id").unwrap();

    assert_eq!(qb.joins().len(), 2);
    assert_eq!(
        qb.get_query().unwrap(),
        "SELECT * FROM users u INNER JOIN roles_v2 r ON u.role_id = r.id NATURAL JOIN profiles p"
    );

    qb.remove_join("p");
    assert_eq!(
        qb.get_query().unwrap(),
        "SELECT * FROM users u INNER JOIN roles_v2 r ON u.role_id = r.id"
    );

    qb.clear_joins();
    assert_eq!(qb.get_query().unwrap(), "SELECT * FROM users u");
}

#[test]
fn test_invalid_join_type() {
    let mut qb = SelectBuilder::new("users");
    let err = qb.join("SIDEWAYS", "roles", "r", "a = b").unwrap_err();
    assert!(err.is_invalid_config());
    assert!(qb.joins().is_empty());
}

#[test]
fn test_outer_join() {
    let mut qb = SelectBuilder::new("a");
    qb.join("outter", "b", "", "a.id = b.id").unwrap();
    assert_eq!(
        qb.get_query().unwrap(),
        "SELECT * FROM a FULL OUTER JOIN b ON a.id = b.id"
    );
}

#[test]
fn test_group_by_and_having() {
    let mut qb = SelectBuilder::new("orders");
    qb.columns(["user_id", "status"])
        .aggregate("count", "*", "n")
        .having(["COUNT(*) > 5"])
        .or_having(["SUM(total) > 100"])
        .order_by(["n DESC", "user_id"]);

    assert_eq!(
        qb.get_query().unwrap(),
        "SELECT user_id,status,COUNT(*) AS n FROM orders \
         GROUP BY user_id,status HAVING COUNT(*) > 5 OR SUM(total) > 100 \
         ORDER BY n DESC, user_id"
    );
}

#[test]
fn test_group_by_flag_without_columns_is_skipped() {
    let mut qb = SelectBuilder::new("orders");
    qb.group_by_columns(true);
    assert_eq!(qb.get_query().unwrap(), "SELECT * FROM orders");

    qb.columns(["status"]);
    assert_eq!(
        qb.get_query().unwrap(),
        "SELECT status FROM orders GROUP BY status"
    );
}

#[test]
fn test_with_distinct_hint_and_offset() {
    let mut recent = SelectBuilder::new("orders");
    recent.where_(["created_at > now() - interval '1 day'"]);

    let mut qb = SelectBuilder::new("recent");
    qb.with("recent", recent)
        .with("vip", "SELECT id FROM users WHERE vip")
        .distinct(true)
        .columns(["user_id"])
        .max_execution_time(1500)
        .unwrap()
        .limit(20)
        .offset(40);

    assert_eq!(
        qb.get_query().unwrap(),
        "WITH recent AS (SELECT * FROM orders WHERE created_at > now() - interval '1 day'), \
         vip AS (SELECT id FROM users WHERE vip) \
         SELECT /*+ MAX_EXECUTION_TIME(1500) */ DISTINCT user_id FROM recent LIMIT 20 OFFSET 40"
    );

    qb.max_execution_time(0).unwrap().limit(0).offset(0).distinct(false);
    assert!(qb.get_query().unwrap().starts_with("WITH recent AS"));
    assert!(qb.get_query().unwrap().ends_with("SELECT user_id FROM recent"));
}

#[test]
fn test_negative_execution_time_rejected() {
    let mut qb = SelectBuilder::new("users");
    let err = qb.max_execution_time(-1).unwrap_err();
    assert!(err.is_invalid_config());
}

#[test]
fn test_subquery_as_from_table() {
    let mut inner = SelectBuilder::new("users");
    inner.where_(["active"]);

    let mut qb = SelectBuilder::aliased(inner, "t");
    qb.columns(["COUNT(*)"]);
    assert_eq!(
        qb.get_query().unwrap(),
        "SELECT COUNT(*) FROM (SELECT * FROM users WHERE active) t"
    );
    assert_eq!(qb.table_name(), None);
}

#[test]
fn test_nested_subquery_error_propagates() {
    let mut qb = SelectBuilder::new("users");
    qb.inner_join(SelectBuilder::new(""), "x", "x.id = users.id");
    assert!(matches!(qb.render(), Err(QbError::MissingTable("SELECT"))));
}

// ==================== UPDATE ====================

#[test]
fn test_update_requires_condition() {
    let mut qb = UpdateBuilder::new("users");
    qb.set_column("status", "'inactive'");

    let err = qb.get_query().unwrap_err();
    assert!(err.is_missing_condition());

    qb.where_(["id = 1"]);
    assert_eq!(
        qb.get_query().unwrap(),
        "UPDATE users SET status='inactive' WHERE id = 1"
    );
}

#[test]
fn test_update_requires_set() {
    let mut qb = UpdateBuilder::new("users");
    qb.where_(["id = 1"]);
    assert!(matches!(qb.render(), Err(QbError::EmptySet)));
}

#[test]
fn test_update_full() {
    let mut qb = UpdateBuilder::aliased("users", "u");
    qb.inner_join("teams", "t", "t.id = u.team_id")
        .set_column("u.status", "'inactive'")
        .add_set_item("u.updated_at", "now()")
        .where_(["t.archived = true"])
        .order_by(["u.id"])
        .limit(100);

    assert_eq!(
        qb.get_query().unwrap(),
        "UPDATE users u INNER JOIN teams t ON t.id = u.team_id \
         SET u.status='inactive', u.updated_at=now() \
         WHERE t.archived = true ORDER BY u.id LIMIT 100"
    );
}

#[test]
fn test_update_set_list_management() {
    let mut qb = UpdateBuilder::new("users");
    qb.set_column("a", "1").set_column("b", "2").set_column("a", "3");
    assert_eq!(qb.get_column("a"), Some("3"));
    assert_eq!(
        qb.set_items(),
        &[
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "3".to_string())
        ]
    );

    qb.set_list(Vec::<(String, String)>::new());
    assert_eq!(qb.set_items().len(), 2);

    qb.set_list([("x", "9")]);
    assert_eq!(qb.get_column("a"), None);
    assert_eq!(qb.get_column("x"), Some("9"));

    qb.remove_column("x").where_(["1=1"]);
    assert!(matches!(qb.render(), Err(QbError::EmptySet)));
}

#[test]
fn test_update_default_has_no_table() {
    let mut qb = UpdateBuilder::default();
    qb.set_column("a", "1").where_(["id = 1"]);
    assert!(matches!(qb.render(), Err(QbError::MissingTable("UPDATE"))));

    qb.set_table("users");
    assert_eq!(qb.get_query().unwrap(), "UPDATE users SET a=1 WHERE id = 1");
}

// ==================== DELETE ====================

#[test]
fn test_delete() {
    let mut qb = delete("sessions");
    qb.where_(["expires_at < now()"]).order_by(["id"]).limit(1000);
    assert_eq!(
        qb.get_query().unwrap(),
        "DELETE sessions WHERE expires_at < now() ORDER BY id LIMIT 1000"
    );
}

#[test]
fn test_delete_aliased_with_join() {
    let mut qb = DeleteBuilder::aliased("sessions", "s");
    qb.left_join("users", "u", "u.id = s.user_id")
        .where_(["u.id IS NULL"]);
    assert_eq!(
        qb.get_query().unwrap(),
        "DELETE sessions s LEFT JOIN users u ON u.id = s.user_id WHERE u.id IS NULL"
    );
}

#[test]
fn test_delete_missing_table() {
    let mut qb = DeleteBuilder::default();
    assert!(matches!(qb.render(), Err(QbError::MissingTable("DELETE"))));
}

// ==================== INSERT ====================

#[test]
fn test_insert_single_row_via_set() {
    let mut qb = insert("users");
    qb.set("name", "'alice'").set("email", "null");
    assert_eq!(
        qb.get_query().unwrap(),
        "INSERT INTO users (name,email) VALUES ('alice',NULL)"
    );
    assert_eq!(qb.pending_row_count(), 1);
    assert!(qb.pending_row().is_empty());
}

#[test]
fn test_insert_without_rows() {
    let mut qb = InsertBuilder::new("users");
    assert!(matches!(qb.render(), Err(QbError::EmptyInsert)));
}

#[test]
fn test_insert_missing_table() {
    let mut qb = InsertBuilder::default();
    qb.add_row(Row::from_values(["1"])).unwrap();
    assert!(matches!(qb.render(), Err(QbError::MissingTable("INSERT"))));
}

#[test]
fn test_insert_empty_column_is_deferred_error() {
    let mut qb = InsertBuilder::new("users");
    qb.set("", "1");
    qb.set("id", "1");
    assert!(matches!(qb.render(), Err(QbError::Validation(_))));
}

#[test]
fn test_insert_empty_column_invalidates_cache() {
    let mut qb = InsertBuilder::new("users");
    qb.set("id", "1");
    assert_eq!(qb.get_query().unwrap(), "INSERT INTO users (id) VALUES (1)");

    qb.set("", "2");
    assert!(!qb.is_rendered());
    assert!(matches!(qb.get_query(), Err(QbError::Validation(_))));

    qb.clear_rows();
    qb.set("id", "3");
    assert_eq!(qb.get_query().unwrap(), "INSERT INTO users (id) VALUES (3)");

    qb.add_column("");
    assert!(qb.get_query().is_err());
    qb.set_columns(["id"]);
    assert_eq!(qb.get_query().unwrap(), "INSERT INTO users (id) VALUES (3)");
}

#[test]
fn test_insert_null_values() {
    let mut qb = InsertBuilder::new("t");
    qb.add_row(Row::from_values(["", "null", "NULL", "'x'", "0"]))
        .unwrap();
    assert_eq!(
        qb.get_query().unwrap(),
        "INSERT INTO t VALUES (NULL,NULL,NULL,'x',0)"
    );
}

#[test]
fn test_insert_column_tracking() {
    let mut qb = InsertBuilder::new("users");
    qb.track_columns(true).set_columns(["id", "name"]);
    qb.add_rows([
        Row::from_pairs([("name", "'bob'"), ("id", "2")]),
        Row::from_pairs([("id", "3"), ("email", "'c@x'")]),
    ])
    .unwrap();

    assert_eq!(qb.columns(), ["id", "name", "email"]);
    assert!(qb.is_column_set("email"));
    assert_eq!(
        qb.get_query().unwrap(),
        "INSERT INTO users (id,name,email) VALUES (2,'bob',NULL), (3,NULL,'c@x')"
    );
}

#[test]
fn test_insert_without_tracking_keeps_row_order() {
    let mut qb = InsertBuilder::new("users");
    qb.set_columns(["id", "name"]);
    qb.add_row(Row::from_pairs([("name", "'bob'"), ("id", "2")]))
        .unwrap();
    assert_eq!(
        qb.get_query().unwrap(),
        "INSERT INTO users (id,name) VALUES ('bob',2)"
    );
}

#[test]
fn test_insert_flush_threshold() {
    let batches = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&batches);

    let mut qb = InsertBuilder::new("events");
    qb.set_columns(["id"]).set_row_limit(2).unwrap();
    qb.on_flush(move |b| {
        let sql = b.get_query()?.to_string();
        seen.lock().unwrap().push((b.pending_row_count(), sql));
        Ok(())
    });

    for id in 1..=5 {
        qb.add_row(Row::from_values([id.to_string()])).unwrap();
    }

    {
        let batches = batches.lock().unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0], (2, "INSERT INTO events (id) VALUES (1), (2)".to_string()));
        assert_eq!(batches[1], (2, "INSERT INTO events (id) VALUES (3), (4)".to_string()));
    }
    assert_eq!(qb.total_flushed(), 4);
    assert_eq!(qb.pending_row_count(), 1);

    // the trailing partial batch only goes out on an explicit flush
    qb.flush().unwrap();
    assert_eq!(batches.lock().unwrap().len(), 3);
    assert_eq!(qb.total_flushed(), 5);
    assert_eq!(qb.pending_row_count(), 0);

    // nothing buffered: callback is not invoked
    qb.flush().unwrap();
    assert_eq!(batches.lock().unwrap().len(), 3);
}

#[test]
fn test_insert_flush_callback_error_keeps_buffer() {
    let mut qb = InsertBuilder::new("events");
    qb.set_row_limit(1).unwrap();
    qb.on_flush(|_| Err(QbError::callback("connection lost")));

    qb.add_row(Row::from_values(["1"])).unwrap();
    let err = qb.add_row(Row::from_values(["2"])).unwrap_err();
    assert!(matches!(err, QbError::Callback(_)));
    assert_eq!(qb.pending_row_count(), 1);
    assert_eq!(qb.total_flushed(), 0);
}

#[test]
fn test_insert_failed_flush_keeps_pending_row() {
    let mut qb = InsertBuilder::new("users");
    qb.set_row_limit(1).unwrap();
    qb.on_flush(|_| Err(QbError::callback("connection lost")));

    qb.add_row(Row::from_values(["1"])).unwrap();
    qb.set("id", "2");

    assert!(matches!(qb.render(), Err(QbError::Callback(_))));
    assert_eq!(qb.pending_row().get("id"), Some("2"));
    assert_eq!(qb.pending_row_count(), 1);
    assert_eq!(qb.pending_rows()[0].values().collect::<Vec<_>>(), ["1"]);
}

#[test]
fn test_insert_render_flushes_full_buffer() {
    let batches = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&batches);

    let mut qb = InsertBuilder::new("users");
    qb.set_row_limit(2).unwrap();
    qb.on_flush(move |b| {
        let sql = b.get_query()?.to_string();
        seen.lock().unwrap().push((b.pending_row_count(), sql));
        Ok(())
    });
    qb.add_rows([
        Row::from_pairs([("id", "1")]),
        Row::from_pairs([("id", "2")]),
    ])
    .unwrap();
    qb.set("id", "3");

    assert_eq!(qb.render().unwrap(), "INSERT INTO users (id) VALUES (3)");
    assert_eq!(
        batches.lock().unwrap().clone(),
        vec![(2, "INSERT INTO users (id) VALUES (1), (2)".to_string())]
    );
    assert_eq!(qb.total_flushed(), 2);
    assert_eq!(qb.pending_row_count(), 1);
    assert!(qb.pending_row().is_empty());
}

#[test]
fn test_insert_flush_without_callback_counts_rows() {
    let mut qb = InsertBuilder::new("events");
    qb.add_rows([Row::from_values(["1"]), Row::from_values(["2"])])
        .unwrap();
    qb.flush().unwrap();
    assert_eq!(qb.total_flushed(), 2);

    qb.add_row(Row::from_values(["3"])).unwrap();
    qb.clear_rows();
    assert_eq!(qb.total_flushed(), 0);
    assert_eq!(qb.pending_row_count(), 0);
}

#[test]
fn test_insert_zero_row_limit_rejected() {
    let mut qb = InsertBuilder::new("events");
    assert!(qb.set_row_limit(0).unwrap_err().is_invalid_config());
    assert_eq!(qb.row_limit(), 558);
}

#[test]
fn test_insert_with_config() {
    let config = BuilderConfig::new()
        .with_insert_row_limit(3)
        .with_track_columns(true);
    let qb = InsertBuilder::with_config("events", &config).unwrap();
    assert_eq!(qb.row_limit(), 3);
    assert!(qb.is_tracking_columns());

    let bad = BuilderConfig::new().with_insert_row_limit(0);
    assert!(InsertBuilder::with_config("events", &bad).is_err());
}

#[test]
fn test_insert_prepare_row_and_clear() {
    let mut qb = InsertBuilder::new("users");
    qb.set("id", "1");
    qb.prepare_row().unwrap();
    assert_eq!(qb.pending_row_count(), 1);

    qb.set("id", "2").clear_pending_row();
    assert!(qb.pending_row().is_empty());
    assert_eq!(qb.get_query().unwrap(), "INSERT INTO users (id) VALUES (1)");
}

#[test]
fn test_bind_json_param() {
    let mut qb = InsertBuilder::new("events");
    let idx = qb.bind_json(&serde_json::json!({"kind": "login"})).unwrap();
    assert_eq!(idx, 1);
    qb.set("payload", format!("${}", idx));
    assert_eq!(
        qb.get_query().unwrap(),
        "INSERT INTO events (payload) VALUES ($1)"
    );
    assert_eq!(qb.params().len(), 1);
}
