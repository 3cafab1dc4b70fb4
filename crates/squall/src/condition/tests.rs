use super::*;
use crate::fields::Fields;
use crate::statement::{Delete, Select};

#[test]
fn test_where_renders_triple() {
    let w = Where::new("x", "=", Value::new(5)).unwrap();
    assert_eq!(w.render(), "WHERE x = 5");
    assert_eq!(
        *w.condition(),
        Condition::new("x", "=", Value::new(5)).unwrap()
    );
}

#[test]
fn test_where_raw_value_is_not_quoted() {
    let w = Where::new("a.id", "=", "b.owner_id").unwrap();
    assert_eq!(w.render(), "WHERE a.id = b.owner_id");
}

#[test]
fn test_operator_is_normalized() {
    let w = Where::new("name", "not  like", Value::new("a%")).unwrap();
    assert_eq!(w.render(), "WHERE name NOT LIKE 'a%'");
}

#[test]
fn test_backend_specific_operators_are_accepted() {
    let w = Where::new("name", "ilike", Value::new("a%")).unwrap();
    assert_eq!(w.render(), "WHERE name ILIKE 'a%'");

    let w = Where::new("n", "not between", "1 AND 5").unwrap();
    assert_eq!(w.render(), "WHERE n NOT BETWEEN 1 AND 5");

    let w = Where::new("name", "REGEXP", Value::new("^a")).unwrap();
    assert_eq!(w.render(), "WHERE name REGEXP '^a'");

    let w = Where::new("a", "is  distinct  from", "b").unwrap();
    assert_eq!(w.render(), "WHERE a IS DISTINCT FROM b");

    for op in ["NOT ILIKE", "MATCH", "SIMILAR TO", "@>"] {
        assert!(Where::new("x", op, "y").is_ok(), "{op} should be accepted");
    }
}

#[test]
fn test_unknown_operator_is_rejected() {
    let err = Where::new("x", "=~", Value::new(1)).unwrap_err();
    assert!(matches!(err, SqlError::InvalidCondition(_)));
}

#[test]
fn test_nested_where_uses_operand() {
    let inner = Where::new("y", "<", Value::new(3)).unwrap();
    let w = Where::new("x", ">", Value::new(1))
        .unwrap()
        .chain(inner.clone())
        .unwrap();
    assert_eq!(w.render(), "WHERE x > 1 AND y < 3");

    let w = w.with_operand(Conjunction::Or);
    assert_eq!(w.render(), "WHERE x > 1 OR y < 3");
}

#[test]
fn test_nested_subquery_keeps_its_where() {
    let sub = Select::new("orders", Fields::new(["owner"]).unwrap())
        .condition(Where::new("total", ">", Value::new(100)).unwrap())
        .unwrap();
    let inner = Where::is_in("id", InList::subquery(sub)).unwrap();
    let w = Where::new("active", "=", Value::new(1))
        .unwrap()
        .chain(inner)
        .unwrap();
    assert_eq!(
        w.render(),
        "WHERE active = 1 AND id IN (SELECT owner FROM orders WHERE total > 100)"
    );
}

#[test]
fn test_select_as_value_is_parenthesized() {
    let sub = Select::new("t", Fields::new(["max(x)"]).unwrap());
    let w = Where::new("x", "=", sub).unwrap();
    assert_eq!(w.render(), "WHERE x = (SELECT max(x) FROM t)");
}

#[test]
fn test_non_select_statement_value_is_rejected() {
    let stmt = crate::Statement::from(Delete::new("t"));
    let err = Where::new("x", "=", stmt).unwrap_err();
    assert!(matches!(err, SqlError::InvalidWhereClause(_)));
}

#[test]
fn test_having_only_attaches_to_group() {
    let having = Having::new("count(*)", ">", Value::new(1)).unwrap();
    assert_eq!(having.render(), "HAVING count(*) > 1");

    let err = Where::new("x", "=", Value::new(1))
        .unwrap()
        .chain(having.clone())
        .unwrap_err();
    assert!(matches!(err, SqlError::InvalidCondition(_)));

    let group = Group::by(["owner"]).unwrap().having(having);
    assert_eq!(group.render(), "GROUP BY owner HAVING count(*) > 1");
}

#[test]
fn test_having_chain_rewrites_nested_where() {
    let having = Having::new("sum(qty)", ">=", Value::new(10))
        .unwrap()
        .chain(Where::new("max(qty)", "<", Value::new(50)).unwrap())
        .unwrap();
    assert_eq!(having.render(), "HAVING sum(qty) >= 10 AND max(qty) < 50");
}

#[test]
fn test_where_in_lists() {
    let w = Where::is_in("id", InList::values([1, 2, 3]).unwrap()).unwrap();
    assert_eq!(w.render(), "WHERE id IN (1, 2, 3)");

    let w = Where::not_in("tag", InList::tuple(Value::tuple(["a", "b"]).unwrap())).unwrap();
    assert_eq!(w.render(), "WHERE tag NOT IN ('a', 'b')");

    let err = InList::values(Vec::<i32>::new()).unwrap_err();
    assert!(matches!(err, SqlError::InvalidValue(_)));
}

#[test]
fn test_order_rendering() {
    let order = Order::by(["a"]).unwrap();
    assert_eq!(order.render(), "ORDER BY a");

    let order = Order::by(["a"])
        .unwrap()
        .columns(["b", "c"])
        .unwrap()
        .collate("BINARY")
        .nocase()
        .sort(Sort::Asc);
    assert_eq!(order.render(), "ORDER BY a, b, c COLLATE BINARY ASC");
}

#[test]
fn test_sort_parsing() {
    assert_eq!("desc".parse::<Sort>().unwrap(), Sort::Desc);
    assert_eq!(" Asc ".parse::<Sort>().unwrap(), Sort::Asc);
    assert!(matches!(
        "sideways".parse::<Sort>(),
        Err(SqlError::InvalidCondition(_))
    ));

    let mut order = Order::by(["x"]).unwrap();
    order.set_sort_str("DESC").unwrap();
    assert_eq!(order.render(), "ORDER BY x DESC");
}

#[test]
fn test_conjunction_parsing() {
    assert_eq!("or".parse::<Conjunction>().unwrap(), Conjunction::Or);
    assert!("xor".parse::<Conjunction>().is_err());
}

#[test]
fn test_set_operand() {
    let mut w = Where::new("a", "=", Value::new(1))
        .unwrap()
        .chain(Where::new("b", "=", Value::new(2)).unwrap())
        .unwrap();
    w.set_operand(Conjunction::Or);
    assert_eq!(w.operand(), Conjunction::Or);
    assert_eq!(w.render(), "WHERE a = 1 OR b = 2");
}

#[test]
fn test_exists_standalone() {
    assert_eq!(Exists::exists().render(), "IF EXISTS");
    assert_eq!(Exists::not_exists().render(), "IF NOT EXISTS");
}

#[test]
fn test_exists_rejects_having_and_nested_exists() {
    let having = Having::new("n", ">", Value::new(1)).unwrap();
    assert!(matches!(
        Exists::exists().with_conditions([Clause::from(having)]),
        Err(SqlError::InvalidCondition(_))
    ));
    assert!(matches!(
        Exists::exists().with_conditions([Clause::from(Exists::not_exists())]),
        Err(SqlError::InvalidCondition(_))
    ));
}
