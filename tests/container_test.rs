//! Navigation, set and delete through Container handles

use dyntree::util::testing;
use dyntree::{Container, JsonKind, TreeError};
use rstest::{fixture, rstest};
use serde_json::{json, Value};

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

#[fixture]
fn people() -> Container {
    Container::consume(json!({
        "a": [{"b": 1}, {"b": 2}, {"c": 3}],
        "user": {"name": "ann", "tags": ["x", "y"], "nick": null},
        "count": 7
    }))
}

// ============================================================
// Search
// ============================================================

#[rstest]
fn given_array_of_objects_when_searching_through_it_then_fans_out_in_order(people: Container) {
    let found = people.search(&["a", "b"]).expect("fan-out result");
    assert_eq!(found.data(), json!([1, 2]));
}

#[rstest]
fn given_no_element_matches_when_fanning_out_then_not_found(people: Container) {
    assert!(people.search(&["a", "missing"]).is_none());
}

#[rstest]
fn given_nested_arrays_when_fanning_out_then_recurses_into_each_level() {
    let doc = Container::consume(json!({"a": [[{"b": 1}], [{"b": 2}, {"x": 0}]]}));
    assert_eq!(doc.path("a.b").unwrap().data(), json!([[1], [2]]));
}

#[rstest]
#[case("user.name", Some(json!("ann")))]
#[case("user.tags", Some(json!(["x", "y"])))]
#[case("user.nick", Some(Value::Null))]
#[case("user.missing", None)]
#[case("count.deeper", None)]
fn given_dotted_path_when_searching_then_returns_expected(
    people: Container,
    #[case] path: &str,
    #[case] expected: Option<Value>,
) {
    assert_eq!(people.path(path).map(|c| c.data()), expected);
}

#[test]
fn given_empty_dotted_path_when_searching_then_returns_whole_value() {
    let doc = Container::consume(json!(7));
    assert_eq!(doc.path("").unwrap().data(), json!(7));
}

#[rstest]
fn given_json_null_when_searching_then_found_handle_is_null(people: Container) {
    let nick = people.search(&["user", "nick"]).unwrap();
    assert!(nick.is_null());
    assert_eq!(nick.kind(), JsonKind::Null);
}

#[rstest]
fn given_empty_path_when_searching_then_returns_same_node(people: Container) {
    let same = people.search(&[]).unwrap();
    assert!(same.same_node(&people));
    assert!(people.s(&[]).unwrap().same_node(&people));
}

#[rstest]
fn given_paths_when_checking_existence_then_matches_search(people: Container) {
    assert!(people.exists(&["a", "c"]));
    assert!(people.exists_p("user.nick"));
    assert!(!people.exists_p("user.age"));
    assert!(!people.exists_p("user,name"));
}

// ============================================================
// Index
// ============================================================

#[rstest]
fn given_array_when_indexing_in_range_then_returns_element(people: Container) {
    let tags = people.path("user.tags").unwrap();
    assert_eq!(tags.index(1).data(), json!("y"));
}

#[rstest]
fn given_out_of_range_or_non_array_when_indexing_then_returns_null_handle(people: Container) {
    let tags = people.path("user.tags").unwrap();
    assert!(tags.index(2).is_null());
    assert!(people.index(0).is_null());
}

// ============================================================
// Set
// ============================================================

#[rstest]
#[case(json!(1))]
#[case(json!("text"))]
#[case(json!([1, {"x": null}]))]
#[case(json!({"deep": {"er": true}}))]
fn given_any_value_when_set_then_search_returns_it(#[case] value: Value) {
    let doc = Container::new();
    doc.set(value.clone(), &["p", "q", "r"]).unwrap();
    assert_eq!(doc.search(&["p", "q", "r"]).unwrap().data(), value);
}

#[test]
fn given_set_result_when_mutated_then_tree_sees_it() {
    let doc = Container::new();
    let inner = doc.set(json!({}), &["a"]).unwrap();
    inner.set(json!(1), &["b"]).unwrap();
    assert_eq!(doc.data(), json!({"a": {"b": 1}}));
}

#[test]
fn given_null_root_when_set_with_path_then_root_becomes_object() {
    let doc = Container::consume(Value::Null);
    doc.set(json!(true), &["flag"]).unwrap();
    assert_eq!(doc.data(), json!({"flag": true}));
}

#[test]
fn given_null_intermediate_when_set_then_replaced_by_object() {
    let doc = Container::consume(json!({"a": null}));
    doc.set_p(json!(1), "a.b").unwrap();
    assert_eq!(doc.data(), json!({"a": {"b": 1}}));
}

#[test]
fn given_scalar_intermediate_when_set_then_path_collision_and_value_untouched() {
    let doc = Container::consume(json!({"a": {"n": 5}}));

    let result = doc.set(json!(1), &["a", "n", "x"]);

    match result {
        Err(TreeError::PathCollision { segment }) => assert_eq!(segment, "x"),
        other => panic!("expected collision, got {:?}", other),
    }
    assert_eq!(doc.data(), json!({"a": {"n": 5}}));
}

#[test]
fn given_collision_deep_in_new_path_when_set_then_nothing_is_written() {
    let doc = Container::consume(json!({"a": {"list": [1]}}));

    assert!(doc.set(json!(1), &["a", "list", "x", "y"]).is_err());

    assert_eq!(doc.data(), json!({"a": {"list": [1]}}));
}

#[test]
fn given_non_object_root_when_set_with_path_then_collision() {
    let doc = Container::consume(json!([1, 2]));
    assert!(matches!(
        doc.set(json!(1), &["a"]),
        Err(TreeError::PathCollision { .. })
    ));
    assert_eq!(doc.data(), json!([1, 2]));
}

#[test]
fn given_empty_path_when_set_then_replaces_value_for_all_aliases() {
    let doc = Container::consume(json!({"a": {"b": 1}}));
    let a = doc.path("a").unwrap();
    let alias = doc.path("a").unwrap();

    a.set(json!("replaced"), &[]).unwrap();

    assert_eq!(alias.data(), json!("replaced"));
    assert_eq!(doc.data(), json!({"a": "replaced"}));
}

#[test]
fn given_detached_null_handle_when_set_then_becomes_object_without_touching_tree() {
    let doc = Container::consume(json!({"list": []}));
    let detached = doc.path("list").unwrap().index(3);

    detached.set(json!(1), &["k"]).unwrap();

    assert_eq!(detached.data(), json!({"k": 1}));
    assert_eq!(doc.data(), json!({"list": []}));
}

#[test]
fn given_missing_intermediate_when_set_existing_then_refuses() {
    let doc = Container::consume(json!({"a": {}}));

    assert!(matches!(
        doc.set_existing_p(json!(1), "a.b.c"),
        Err(TreeError::MissingSegment { segment }) if segment == "b"
    ));
    doc.set_existing_p(json!(1), "a.b").unwrap();

    assert_eq!(doc.data(), json!({"a": {"b": 1}}));
}

// ============================================================
// Delete
// ============================================================

#[rstest]
#[case(&["x"][..])]
#[case(&["x", "y"][..])]
#[case(&["x", "y", "z"][..])]
fn given_set_path_when_deleted_then_no_longer_exists(#[case] path: &[&str]) {
    let doc = Container::new();
    doc.set(json!(1), path).unwrap();

    doc.delete(path).unwrap();

    assert!(!doc.exists(path));
}

#[rstest]
fn given_missing_key_when_deleting_then_not_object(people: Container) {
    assert!(matches!(
        people.delete_p("user.age"),
        Err(TreeError::NotObject)
    ));
}

#[rstest]
fn given_array_on_path_when_deleting_then_does_not_fan_out(people: Container) {
    assert!(matches!(people.delete_p("a.b"), Err(TreeError::NotObject)));
    assert_eq!(people.path("a.b").unwrap().data(), json!([1, 2]));
}

#[rstest]
fn given_empty_path_or_null_root_when_deleting_then_not_object(people: Container) {
    assert!(matches!(people.delete(&[]), Err(TreeError::NotObject)));
    let null_root = Container::consume(Value::Null);
    assert!(matches!(null_root.delete(&["a"]), Err(TreeError::NotObject)));
}

// ============================================================
// Children and arena maintenance
// ============================================================

#[rstest]
fn given_object_when_listing_children_then_returns_values(people: Container) {
    let user = people.path("user").unwrap();
    let map = user.child_map().unwrap();
    assert_eq!(map["name"].data(), json!("ann"));
    assert_eq!(user.children().unwrap().len(), 3);
    assert!(matches!(
        people.path("count").unwrap().children(),
        Err(TreeError::NotObjectOrArray)
    ));
}

#[test]
fn given_detached_nodes_when_sweeping_then_tree_is_unchanged_and_stale_handles_read_null() {
    let doc = Container::consume(json!({"a": [{"b": 1}, {"b": 2}], "old": {"x": 1}}));
    let fan_out = doc.path("a.b").unwrap();
    let old = doc.path("old").unwrap();
    doc.set(json!("new"), &["old"]).unwrap();
    let before = doc.data();

    let freed = doc.sweep();

    assert!(freed >= 3);
    assert_eq!(doc.data(), before);
    assert!(fan_out.is_null());
    assert!(old.is_null());
}

#[test]
fn given_repeated_reads_when_sweeping_then_nothing_was_allocated() {
    let doc = Container::consume(json!({"a": [{"b": 1}, {"b": 2}], "l": [1]}));

    for _ in 0..1000 {
        assert_eq!(doc.array_count_p("a.b").unwrap(), 2);
        assert_eq!(doc.array_element_p(1, "a.b").unwrap().data(), json!(2));
        assert!(doc.path("l").unwrap().index(5).is_null());
        assert!(doc.exists_p("a.b"));
        assert!(doc.array_remove_p(0, "a.b").is_err());
        assert!(doc.array_append_p(json!(3), "a.b").is_err());
    }

    assert_eq!(doc.sweep(), 0);
    assert_eq!(doc.data(), json!({"a": [{"b": 1}, {"b": 2}], "l": [1]}));
}
