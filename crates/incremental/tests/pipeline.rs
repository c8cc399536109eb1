//! End-to-end pipeline scenarios: source, builder, operators and sinks.

use rill_core::{Result, Row, Value};
use rill_incremental::builder::{build_pipeline, build_where, BuilderDelegate, DefaultDelegate};
use rill_incremental::source::{MemorySource, Source, SourceChange};
use rill_incremental::{
    CaughtChange, Catch, Change, FanIn, FanOut, FetchRequest, Filter, Input, MaterializedView,
    Output,
};
use rill_query::{
    order_by, Condition, CorrelatedSubquery, CorrelatedSubqueryCondition, Correlation,
    SimpleOperator, SortOrder,
};
use std::rc::Rc;

fn ab(a: i64, b: &str) -> Row {
    Row::new().with("a", a).with("b", b)
}

fn ab_source() -> MemorySource {
    let source = MemorySource::new("t", vec!["a".into(), "b".into()], vec!["a".into()]);
    for row in [ab(3, "foo"), ab(2, "bar"), ab(1, "foo")] {
        source.push(SourceChange::Add(row)).unwrap();
    }
    source
}

fn column(rows: &[Row], name: &str) -> Vec<i64> {
    rows.iter().filter_map(|r| r.get(name).and_then(Value::as_i64)).collect()
}

#[test]
fn filter_fetch_push_cleanup() {
    let source = ab_source();
    let conn = source.connect(order_by([("a", SortOrder::Asc)]), None).unwrap();
    let filter = Filter::new(conn.input, |row: &Row| row.get("b") == Some(&Value::from("foo")));
    let catch = Catch::new(filter);

    assert_eq!(catch.fetch(FetchRequest::all()), vec![ab(1, "foo"), ab(3, "foo")]);

    source.push(SourceChange::Add(ab(5, "foo"))).unwrap();
    source.push(SourceChange::Remove(ab(3, "foo"))).unwrap();
    assert_eq!(
        catch.take_pushes(),
        vec![CaughtChange::Add(ab(5, "foo")), CaughtChange::Remove(ab(3, "foo"))]
    );

    assert_eq!(column(&catch.cleanup(FetchRequest::all()), "a"), vec![1, 5]);
}

#[test]
fn edit_outside_predicate_is_invisible() {
    let source = MemorySource::new("t", vec!["id".into(), "x".into()], vec!["id".into()]);
    source
        .push(SourceChange::Add(Row::new().with("id", 1).with("x", 2)))
        .unwrap();
    source
        .push(SourceChange::Add(Row::new().with("id", 2).with("x", 5)))
        .unwrap();

    let even = Condition::cmp_list("x", SimpleOperator::In, (0..10).step_by(2).map(Value::Int64));
    let conn = source.connect(order_by([("id", SortOrder::Asc)]), None).unwrap();
    let pipeline = build_where(conn.input, &even, &DefaultDelegate).unwrap();
    let view = MaterializedView::new(pipeline);

    source
        .push(SourceChange::Edit {
            old_row: Row::new().with("id", 2).with("x", 5),
            row: Row::new().with("id", 2).with("x", 7),
        })
        .unwrap();

    assert_eq!(view.version(), 0);
    assert_eq!(column(&view.rows(), "id"), vec![1]);
}

#[test]
fn fan_in_reconstructs_cross_branch_edit() {
    let source = MemorySource::new("t", vec!["id".into(), "x".into()], vec!["id".into()]);
    let row = |x: i64| Row::new().with("id", 1).with("x", x);
    source.push(SourceChange::Add(row(1))).unwrap();

    let conn = source.connect(order_by([("id", SortOrder::Asc)]), None).unwrap();
    let fan_out = FanOut::new(conn.input);
    let low: Rc<dyn Input> = Filter::new(fan_out.clone(), |r: &Row| {
        r.get("x").and_then(Value::as_i64).map_or(false, |x| x < 5)
    });
    let high: Rc<dyn Input> = Filter::new(fan_out.clone(), |r: &Row| {
        r.get("x").and_then(Value::as_i64).map_or(false, |x| x >= 5)
    });
    let fan_in = FanIn::new(&fan_out, vec![low, high]).unwrap();
    let catch = Catch::new(fan_in);

    source
        .push(SourceChange::Edit {
            old_row: row(1),
            row: row(9),
        })
        .unwrap();
    assert_eq!(
        catch.take_pushes(),
        vec![CaughtChange::Edit {
            old_row: row(1),
            row: row(9),
        }]
    );
}

#[test]
fn materialized_view_matches_fresh_fetch() {
    let source = ab_source();
    let condition = Condition::or(vec![
        Condition::cmp("b", SimpleOperator::Eq, "foo"),
        Condition::cmp("a", SimpleOperator::Gt, 10),
    ]);
    let sort = order_by([("b", SortOrder::Desc)]);
    let pipeline = build_pipeline(&source, sort, Some(&condition), &DefaultDelegate).unwrap();
    let view = MaterializedView::new(pipeline.clone());

    let changes = vec![
        SourceChange::Add(ab(11, "baz")),
        SourceChange::Add(ab(4, "foo")),
        SourceChange::Edit {
            old_row: ab(2, "bar"),
            row: ab(2, "foo"),
        },
        SourceChange::Edit {
            old_row: ab(11, "baz"),
            row: ab(11, "qux"),
        },
        SourceChange::Remove(ab(1, "foo")),
        SourceChange::Edit {
            old_row: ab(3, "foo"),
            row: ab(3, "nope"),
        },
    ];
    for change in changes {
        source.push(change).unwrap();
        let fresh: Vec<Row> = pipeline.fetch(FetchRequest::all()).map(|n| n.row).collect();
        assert_eq!(*view.rows(), fresh);
    }
    assert_eq!(column(&view.rows(), "a"), vec![11, 2, 4]);
}

/// Treats `EXISTS label` as "the row has a `label` column set".
struct LabelDelegate;

impl BuilderDelegate for LabelDelegate {
    fn apply_subquery(
        &self,
        input: Rc<dyn Input>,
        condition: &CorrelatedSubqueryCondition,
    ) -> Result<Rc<dyn Input>> {
        let field = condition.related.correlation.parent_field[0].clone();
        let filter: Rc<dyn Input> = Filter::new(input, move |row: &Row| {
            row.get(&field).map_or(false, |v| !v.is_null())
        });
        Ok(filter)
    }
}

#[test]
fn or_with_subquery_through_builder() {
    let source = MemorySource::new(
        "issue",
        vec!["id".into(), "priority".into(), "label".into()],
        vec!["id".into()],
    );
    let issue = |id: i64, priority: i64, label: Option<&str>| {
        Row::new()
            .with("id", id)
            .with("priority", priority)
            .with("label", label)
    };
    source.push(SourceChange::Add(issue(1, 1, None))).unwrap();
    source.push(SourceChange::Add(issue(2, 5, None))).unwrap();
    source.push(SourceChange::Add(issue(3, 1, Some("bug")))).unwrap();
    source.push(SourceChange::Add(issue(4, 5, Some("bug")))).unwrap();

    let labelled = Condition::exists(CorrelatedSubquery {
        table: "label".into(),
        alias: None,
        correlation: Correlation {
            parent_field: vec!["label".into()],
            child_field: vec!["name".into()],
        },
        condition: None,
    });
    let condition = Condition::or(vec![Condition::cmp("priority", SimpleOperator::Ge, 5), labelled]);
    let pipeline = build_pipeline(
        &source,
        order_by([("id", SortOrder::Asc)]),
        Some(&condition),
        &LabelDelegate,
    )
    .unwrap();
    let catch = Catch::new(pipeline.clone());

    // id 4 matches both branches and is fetched once
    assert_eq!(column(&catch.fetch(FetchRequest::all()), "id"), vec![2, 3, 4]);

    // moves from the subquery branch to the priority branch
    source
        .push(SourceChange::Edit {
            old_row: issue(3, 1, Some("bug")),
            row: issue(3, 7, None),
        })
        .unwrap();
    // leaves both
    source
        .push(SourceChange::Edit {
            old_row: issue(4, 5, Some("bug")),
            row: issue(4, 1, None),
        })
        .unwrap();
    // relevant to both, forwarded once
    source.push(SourceChange::Add(issue(5, 9, Some("ux")))).unwrap();

    assert_eq!(
        catch.take_pushes(),
        vec![
            CaughtChange::Edit {
                old_row: issue(3, 1, Some("bug")),
                row: issue(3, 7, None),
            },
            CaughtChange::Remove(issue(4, 5, Some("bug"))),
            CaughtChange::Add(issue(5, 9, Some("ux"))),
        ]
    );
    assert_eq!(column(&catch.fetch(FetchRequest::all()), "id"), vec![2, 3, 5]);

    catch.destroy();
    assert_eq!(source.connection_count(), 0);
}

#[test]
fn child_change_follows_parent_membership() {
    let source = MemorySource::new("t", vec!["id".into()], vec!["id".into()]);
    let conn = source.connect(order_by([("id", SortOrder::Asc)]), None).unwrap();
    let filter = Filter::new(conn.input, |row: &Row| {
        row.get("id").and_then(Value::as_i64) == Some(1)
    });
    let catch = Catch::new(filter.clone());

    let comment = Row::new().with("id", 10);
    filter.push(Change::child(Row::new().with("id", 1), "comments", Change::add(comment.clone())));
    filter.push(Change::child(Row::new().with("id", 2), "comments", Change::add(comment.clone())));

    assert_eq!(
        catch.take_pushes(),
        vec![CaughtChange::Child {
            row: Row::new().with("id", 1),
            relationship_name: "comments".into(),
            change: Box::new(CaughtChange::Add(comment)),
        }]
    );
}
