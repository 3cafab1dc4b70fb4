use super::*;
use crate::condition::{Exists, Group, Having, InList, Order, Sort, Where};
use crate::dialect::{PostgresDialect, SqlServerDialect, SqliteDialect};
use crate::fields::Fields;
use crate::table::{Column, Constraint};
use crate::value::Value;
use chrono::NaiveDate;

fn fields(names: &[&str]) -> Fields {
    Fields::new(names.iter().copied()).unwrap()
}

#[test]
fn test_command_parsing() {
    assert_eq!("select".parse::<Command>().unwrap(), Command::Select);
    assert_eq!(" Drop ".parse::<Command>().unwrap(), Command::Drop);
    assert!(matches!(
        "MERGE".parse::<Command>(),
        Err(SqlError::InvalidSqlCommand(_))
    ));
}

#[test]
fn test_simple_select() {
    assert_eq!(Select::all("users").render(), "SELECT * FROM users");
    assert_eq!(
        Select::new("users", Fields::empty()).render(),
        "SELECT * FROM users"
    );
}

#[test]
fn test_select_with_distinct_fields() {
    let f = fields(&["a", "b"]).distinct(["a"]).unwrap();
    assert_eq!(
        Select::new("t", f).render(),
        "SELECT DISTINCT (a), b FROM t"
    );
}

#[test]
fn test_select_clause_order() {
    let q = Select::new("orders", fields(&["owner", "sum(total)"]))
        .with_conditions([
            Clause::from(Order::by(["owner"]).unwrap().sort(Sort::Desc)),
            Clause::from(
                Group::by(["owner"])
                    .unwrap()
                    .having(Having::new("sum(total)", ">", Value::new(10)).unwrap()),
            ),
            Clause::from(Where::new("status", "=", Value::new("open")).unwrap()),
        ])
        .unwrap();
    assert_eq!(
        q.render(),
        "SELECT owner, sum(total) FROM orders WHERE status = 'open' \
         GROUP BY owner HAVING sum(total) > 10 ORDER BY owner DESC"
    );
}

#[test]
fn test_select_rejects_bare_having() {
    let having = Having::new("n", ">", Value::new(1)).unwrap();
    let err = Select::all("t").condition(having).unwrap_err();
    assert!(matches!(err, SqlError::InvalidCondition(_)));
}

#[test]
fn test_select_renders_dates_per_dialect() {
    let day = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
    let q = Select::all("events")
        .condition(Where::new("day", ">=", Value::new(day)).unwrap())
        .unwrap();
    assert_eq!(
        q.render_with(&SqliteDialect),
        "SELECT * FROM events WHERE day >= '2020-02-29'"
    );
    assert_eq!(
        q.render_with(&PostgresDialect),
        "SELECT * FROM events WHERE day >= DATE '2020-02-29'"
    );
    assert_eq!(
        q.render_with(&SqlServerDialect),
        "SELECT * FROM events WHERE day >= '20200229'"
    );
}

#[test]
fn test_insert_with_fields() {
    let ins = Insert::new("t", fields(&["a", "b"]), [Value::new(1), Value::new("x")]).unwrap();
    assert_eq!(ins.render(), "INSERT INTO t(a, b) VALUES (1, 'x')");
}

#[test]
fn test_insert_without_fields() {
    let ins = Insert::new("t", Fields::empty(), [1, 2, 3]).unwrap();
    assert_eq!(ins.render(), "INSERT INTO t VALUES (1, 2, 3)");

    let ins = Insert::new("t", Fields::all(), [1]).unwrap();
    assert_eq!(ins.render(), "INSERT INTO t VALUES (1)");
}

#[test]
fn test_insert_count_mismatch() {
    let err = Insert::new("t", fields(&["a", "b"]), [1]).unwrap_err();
    assert!(matches!(err, SqlError::InvalidValue(_)));
    let err = Insert::new("t", Fields::empty(), Vec::<Value>::new()).unwrap_err();
    assert!(matches!(err, SqlError::InvalidValue(_)));
}

#[test]
fn test_insert_rejects_tuple_values() {
    let pair = Value::tuple([1, 2]).unwrap();
    let err = Insert::new("t", fields(&["a"]), [pair.clone()]).unwrap_err();
    assert!(matches!(err, SqlError::InvalidValue(_)));
    let err = Insert::new("t", Fields::empty(), [Value::new(0), pair]).unwrap_err();
    assert!(matches!(err, SqlError::InvalidValue(_)));
}

#[test]
fn test_update() {
    let up = Update::new("t", fields(&["a", "b"]), [Value::new(1), Value::null()])
        .unwrap()
        .condition(Where::new("id", "=", Value::new(9)).unwrap())
        .unwrap();
    assert_eq!(up.render(), "UPDATE t SET a = 1, b = NULL WHERE id = 9");
}

#[test]
fn test_update_rejects_bad_values() {
    let err = Update::new("t", fields(&["a"]), [1, 2]).unwrap_err();
    assert!(matches!(err, SqlError::InvalidValue(_)));

    let tuple = Value::tuple([1, 2]).unwrap();
    let err = Update::new("t", fields(&["a"]), [tuple]).unwrap_err();
    assert!(matches!(err, SqlError::InvalidValue(_)));

    let err = Update::new("t", Fields::all(), [1]).unwrap_err();
    assert!(matches!(err, SqlError::InvalidFieldFormat(_)));
}

#[test]
fn test_delete() {
    assert_eq!(Delete::new("t").render(), "DELETE FROM t");
    let del = Delete::new("t")
        .condition(Where::is_in("id", InList::values([1, 2]).unwrap()).unwrap())
        .unwrap();
    assert_eq!(del.render(), "DELETE FROM t WHERE id IN (1, 2)");
}

#[test]
fn test_create_with_constraints() {
    let create = Create::new(
        "t",
        [
            Column::new("x").sql_type("INTEGER").not_null(),
            Column::new("owner").sql_type("INTEGER"),
        ],
    )
    .unwrap()
    .with_constraints([
        Constraint::primary_key(["x"]).sorted(Sort::Asc),
        Constraint::foreign_key("owner", "users", "id"),
    ]);
    assert_eq!(
        create.render(),
        "CREATE TABLE t(x INTEGER NOT NULL, owner INTEGER, \
         PRIMARY KEY(x ASC), FOREIGN KEY(owner) REFERENCES users(id))"
    );
}

#[test]
fn test_create_requires_columns() {
    let err = Create::new("t", Vec::<Column>::new()).unwrap_err();
    assert!(matches!(err, SqlError::InvalidFieldFormat(_)));
}

#[test]
fn test_drop_exists_forms() {
    let drop = DropTable::new("t").if_exists();
    assert_eq!(drop.render_with(&SqliteDialect), "DROP TABLE IF EXISTS t");
    assert_eq!(DropTable::new("t").render(), "DROP TABLE t");
    assert_eq!(
        drop.render_with(&SqlServerDialect),
        "IF EXISTS(SELECT * FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_NAME = 't') DROP TABLE t"
    );
}

#[test]
fn test_create_exists_forms() {
    let create = Create::new("t", ["x"]).unwrap().if_not_exists();
    assert_eq!(
        create.render_with(&PostgresDialect),
        "CREATE TABLE IF NOT EXISTS t(x)"
    );
    assert_eq!(
        create.render_with(&SqlServerDialect),
        "IF NOT EXISTS(SELECT * FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_NAME = 't') CREATE TABLE t(x)"
    );
}

#[test]
fn test_table_guards_reject_wrong_polarity() {
    let err = Create::new("t", ["x"]).unwrap().exists(Exists::exists()).unwrap_err();
    assert!(matches!(err, SqlError::InvalidCondition(_)));

    let err = DropTable::new("t").exists(Exists::not_exists()).unwrap_err();
    assert!(matches!(err, SqlError::InvalidCondition(_)));

    let drop = DropTable::new("t").exists(Exists::exists()).unwrap();
    assert_eq!(drop, DropTable::new("t").if_exists());
}

#[test]
fn test_table_guards_reject_subqueries_and_conditions() {
    let guard = Exists::exists().subquery(Select::all("catalog"));
    assert!(matches!(
        DropTable::new("t").exists(guard),
        Err(SqlError::InvalidCondition(_))
    ));

    let guard = Exists::not_exists()
        .with_conditions([Where::new("x", "=", Value::new(1)).unwrap()])
        .unwrap();
    assert!(matches!(
        Create::new("t", ["x"]).unwrap().exists(guard),
        Err(SqlError::InvalidCondition(_))
    ));
}

#[test]
fn test_select_exists_with_subquery() {
    let sub = Select::new("orders", fields(&["id"]))
        .condition(Where::new("orders.owner", "=", "users.id").unwrap())
        .unwrap();
    let q = Select::new("users", fields(&["name"]))
        .condition(Exists::exists().subquery(sub))
        .unwrap();
    assert_eq!(
        q.render_with(&SqliteDialect),
        "SELECT name FROM users WHERE EXISTS (SELECT id FROM orders WHERE orders.owner = users.id)"
    );
    assert_eq!(
        q.render_with(&SqlServerDialect),
        "IF EXISTS(SELECT id FROM orders WHERE orders.owner = users.id) SELECT name FROM users"
    );
}

#[test]
fn test_select_exists_joins_existing_where() {
    let q = Select::new("users", fields(&["name"]))
        .condition(Where::new("active", "=", Value::new(1)).unwrap())
        .unwrap()
        .condition(Exists::not_exists().subquery(Select::all("bans")))
        .unwrap();
    assert_eq!(
        q.render(),
        "SELECT name FROM users WHERE active = 1 AND NOT EXISTS (SELECT * FROM bans)"
    );
}

#[test]
fn test_select_exists_lookup() {
    let guard = Exists::exists()
        .with_conditions([Where::new("id", "=", Value::new(1)).unwrap()])
        .unwrap();
    let q = Select::new("users", fields(&["id"])).condition(guard).unwrap();
    assert_eq!(
        q.render_with(&SqliteDialect),
        "SELECT EXISTS(SELECT id FROM users WHERE id = 1)"
    );
    assert_eq!(
        q.render_with(&SqlServerDialect),
        "SELECT CASE WHEN EXISTS(SELECT id FROM users WHERE id = 1) THEN 1 ELSE 0 END"
    );
}

#[test]
fn test_mutation_exists_needs_subquery() {
    let err = Delete::new("t").condition(Exists::exists()).unwrap_err();
    assert!(matches!(err, SqlError::InvalidCondition(_)));

    let del = Delete::new("t")
        .condition(Exists::exists().subquery(Select::all("locks")))
        .unwrap();
    assert_eq!(
        del.render(),
        "DELETE FROM t WHERE EXISTS (SELECT * FROM locks)"
    );
}

#[test]
fn test_statement_classification() {
    let select = Statement::from(Select::all("t"));
    assert!(select.is_query());
    assert_eq!(select.command(), Some(Command::Select));

    let raw = Statement::from("  with x as (select 1) select * from x");
    assert!(raw.is_query());

    let raw = Statement::from("insert into t values (1)");
    assert!(!raw.is_query());
    assert_eq!(raw.command(), Some(Command::Insert));

    let raw = Statement::from("VACUUM");
    assert_eq!(raw.command(), None);
}

#[test]
fn test_blank_verbatim_is_invalid() {
    let err = Statement::from("   ").validate().unwrap_err();
    assert!(matches!(err, SqlError::InvalidSquallObject(_)));
    assert!(Statement::from("SELECT 1").validate().is_ok());
}

#[test]
fn test_statement_display_matches_render() {
    let stmt = Statement::from(Delete::new("t"));
    assert_eq!(stmt.to_string(), stmt.render());
}
