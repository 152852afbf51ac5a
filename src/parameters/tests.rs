use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use super::*;
use crate::fixtures::{Fixture, Stored};
use crate::schema::DataTypeCode;

const ROOT_TYPE: i64 = 1;

/// Root "Record" with a settings group and a results group
fn parameter_fixture() -> Fixture {
    Fixture::new()
        .param_type(1, "Record", DataTypeCode::None)
        .param_type(2, "Settings", DataTypeCode::Dictionary)
        .param_type(3, "Temperature", DataTypeCode::Double)
        .param_type(4, "Number Of Runs", DataTypeCode::Int32)
        .param_type(5, "Results", DataTypeCode::None)
        .param_type(6, "Sizes", DataTypeCode::DoubleArray)
        .param_type(7, "Sample Name", DataTypeCode::Text)
        .param_type(8, "Is Valid", DataTypeCode::Boolean)
        .param_type(9, "Run Count", DataTypeCode::Int64OrInt32)
        .param_type(10, "Future Field", DataTypeCode::Unrecognized(77))
        .param_type(11, "Total Counts", DataTypeCode::Int64)
        // Inserted out of sibling order on purpose
        .node(100, ROOT_TYPE, 1, None, 0)
        .node(103, ROOT_TYPE, 5, Some(100), 2)
        .node(101, ROOT_TYPE, 7, Some(100), 0)
        .node(102, ROOT_TYPE, 2, Some(100), 1)
        .node(111, ROOT_TYPE, 4, Some(102), 1)
        .node(110, ROOT_TYPE, 3, Some(102), 0)
        .node(120, ROOT_TYPE, 6, Some(103), 0)
        .node(121, ROOT_TYPE, 8, Some(103), 1)
        .node(122, ROOT_TYPE, 9, Some(103), 2)
        .node(123, ROOT_TYPE, 10, Some(103), 3)
        .node(124, ROOT_TYPE, 11, Some(103), 4)
}

fn open_fixture(fixture: Fixture) -> (TypeRegistry, crate::store::SqliteSource) {
    let mut source = fixture.into_source();
    let registry = TypeRegistry::load(&mut source).unwrap();
    (registry, source)
}

#[test]
fn test_load_types() {
    let (registry, _) = open_fixture(parameter_fixture());
    assert_eq!(registry.len(), 11);
    let temperature = registry.get(3).unwrap();
    assert_eq!(temperature.friendly_name, "Temperature");
    assert_eq!(temperature.data_type, DataTypeCode::Double);
    assert_eq!(temperature.urn, "urn:test:temperature");
    assert_eq!(
        registry.get(10).unwrap().data_type,
        DataTypeCode::Unrecognized(77)
    );
}

#[test]
fn test_load_types_missing_table() {
    let fixture = Fixture::new();
    fixture.conn.execute_batch("DROP TABLE ParameterType").unwrap();
    let mut source = fixture.into_source();
    let err = TypeRegistry::load(&mut source).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::MissingTable {
            table: "ParameterType",
            ..
        }
    ));
}

#[test]
fn test_build_tree_orders_children() {
    let (registry, mut source) = open_fixture(parameter_fixture());
    let tree = build_tree(&mut source, &registry, ROOT_TYPE).unwrap();

    assert_eq!(tree.id, 100);
    assert_eq!(tree.name(), "Record");
    assert_eq!(tree.len(), 11);
    assert_eq!(
        tree.preorder_ids(),
        vec![100, 101, 102, 110, 111, 103, 120, 121, 122, 123, 124]
    );
}

#[test]
fn test_build_tree_unknown_type() {
    let fixture = parameter_fixture().node(130, ROOT_TYPE, 999, Some(100), 9);
    let (registry, mut source) = open_fixture(fixture);
    let err = build_tree(&mut source, &registry, ROOT_TYPE).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::UnknownType {
            node_id: 130,
            type_id: 999
        }
    ));
}

#[test]
fn test_build_tree_no_root() {
    let fixture = Fixture::new()
        .param_type(1, "Record", DataTypeCode::None)
        .node(1, ROOT_TYPE, 1, Some(2), 0)
        .node(2, ROOT_TYPE, 1, Some(1), 0);
    let (registry, mut source) = open_fixture(fixture);
    let err = build_tree(&mut source, &registry, ROOT_TYPE).unwrap_err();
    assert!(matches!(err, SchemaError::NoRoot { root_type_id: 1 }));
}

#[test]
fn test_build_tree_empty_scope_has_no_root() {
    let (registry, mut source) = open_fixture(parameter_fixture());
    let err = build_tree(&mut source, &registry, 42).unwrap_err();
    assert!(matches!(err, SchemaError::NoRoot { root_type_id: 42 }));
}

#[test]
fn test_build_tree_multiple_roots() {
    let fixture = parameter_fixture().node(200, ROOT_TYPE, 1, None, 0);
    let (registry, mut source) = open_fixture(fixture);
    let err = build_tree(&mut source, &registry, ROOT_TYPE).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::MultipleRoots {
            root_type_id: 1,
            count: 2
        }
    ));
}

#[test]
fn test_build_tree_dangling_parent() {
    let fixture = parameter_fixture().node(130, ROOT_TYPE, 3, Some(555), 0);
    let (registry, mut source) = open_fixture(fixture);
    let err = build_tree(&mut source, &registry, ROOT_TYPE).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::DanglingParent {
            node_id: 130,
            parent_id: 555
        }
    ));
}

#[test]
fn test_build_tree_detached_cycle() {
    let fixture = parameter_fixture()
        .node(140, ROOT_TYPE, 3, Some(141), 0)
        .node(141, ROOT_TYPE, 3, Some(140), 0);
    let (registry, mut source) = open_fixture(fixture);
    let err = build_tree(&mut source, &registry, ROOT_TYPE).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::Unreachable {
            root_type_id: 1,
            count: 2
        }
    ));
}

#[test]
fn test_build_tree_scoped_by_root_type() {
    let fixture = parameter_fixture()
        .param_type(50, "Other Root", DataTypeCode::None)
        .node(500, 50, 50, None, 0)
        .node(501, 50, 3, Some(500), 0);
    let (registry, mut source) = open_fixture(fixture);

    let other = build_tree(&mut source, &registry, 50).unwrap();
    assert_eq!(other.preorder_ids(), vec![500, 501]);
    let main = build_tree(&mut source, &registry, ROOT_TYPE).unwrap();
    assert_eq!(main.len(), 11);
}

#[test]
fn test_tree_cache_reuses_trees() {
    let (registry, mut source) = open_fixture(parameter_fixture());
    let mut cache = TreeCache::new();
    let first = cache.get_or_build(&mut source, &registry, ROOT_TYPE).unwrap();
    let second = cache.get_or_build(&mut source, &registry, ROOT_TYPE).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_attach_values() {
    let fixture = parameter_fixture()
        .value(1, 101, Stored::Text("Latex 60nm"))
        .value(1, 102, Stored::Empty)
        .value(1, 110, Stored::Double(25.0))
        .value(1, 111, Stored::Int32(3))
        .value(1, 120, Stored::Array(&[0.3, 1.0, 10000.0]))
        .value(1, 121, Stored::Boolean(false))
        .value(1, 122, Stored::Int32(12))
        .value(1, 123, Stored::Double(1.0))
        .value(1, 124, Stored::Int64(1 << 40));
    let (registry, mut source) = open_fixture(fixture);
    let tree = build_tree(&mut source, &registry, ROOT_TYPE).unwrap();

    let root = ValueExtractor::new()
        .attach_values(&mut source, 1, &tree)
        .unwrap();

    assert_eq!(root.name, "Record");
    assert_eq!(root.value, None);
    let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Sample Name", "Settings", "Results"]);

    assert_eq!(
        root.find("Sample Name").unwrap().value,
        Some(ParameterValue::Text("Latex 60nm".to_string()))
    );

    // Dictionary node: no value, but name, urn and children intact
    let settings = root.find_child("Settings").unwrap();
    assert_eq!(settings.value, None);
    assert_eq!(settings.urn, "urn:test:settings");
    assert_eq!(settings.children.len(), 2);

    assert_eq!(
        root.find("Temperature").unwrap().value,
        Some(ParameterValue::Real(25.0))
    );
    assert_eq!(
        root.find("Number Of Runs").unwrap().value,
        Some(ParameterValue::Integer(3))
    );
    assert_eq!(
        root.find("Sizes").unwrap().value,
        Some(ParameterValue::Array(vec![0.3, 1.0, 10000.0]))
    );
    // Boolean false is a value, not an absence
    assert_eq!(
        root.find("Is Valid").unwrap().value,
        Some(ParameterValue::Boolean(false))
    );
    // 64-bit code falls back to the 32-bit column
    assert_eq!(
        root.find("Run Count").unwrap().value,
        Some(ParameterValue::Integer(12))
    );
    assert_eq!(
        root.find("Total Counts").unwrap().value,
        Some(ParameterValue::Integer(1 << 40))
    );
    // Unknown codes degrade to no value
    assert_eq!(root.find("Future Field").unwrap().value, None);
}

#[test]
fn test_wide_int32_column_is_kept() {
    let fixture = parameter_fixture()
        .value(1, 111, Stored::Integer(3_000_000_000))
        .value(1, 122, Stored::Integer(3_000_000_000));
    let (registry, mut source) = open_fixture(fixture);
    let tree = build_tree(&mut source, &registry, ROOT_TYPE).unwrap();
    let root = ValueExtractor::new().attach_values(&mut source, 1, &tree).unwrap();
    assert_eq!(
        root.find("Number Of Runs").unwrap().value,
        Some(ParameterValue::Integer(3_000_000_000))
    );
    assert_eq!(
        root.find("Run Count").unwrap().value,
        Some(ParameterValue::Integer(3_000_000_000))
    );
}

#[test]
fn test_single_column_fallback() {
    let fixture = parameter_fixture().value(7, 110, Stored::Single(2.5));
    let (registry, mut source) = open_fixture(fixture);
    let tree = build_tree(&mut source, &registry, ROOT_TYPE).unwrap();
    let root = ValueExtractor::new().attach_values(&mut source, 7, &tree).unwrap();
    assert_eq!(
        root.find("Temperature").unwrap().value,
        Some(ParameterValue::Real(2.5))
    );
}

#[test]
fn test_record_without_rows_has_no_values() {
    let (registry, mut source) = open_fixture(parameter_fixture());
    let tree = build_tree(&mut source, &registry, ROOT_TYPE).unwrap();
    let root = ValueExtractor::new().attach_values(&mut source, 99, &tree).unwrap();
    assert_eq!(root.len(), tree.len());
    assert!(root.walk().all(|p| p.value.is_none()));
}

#[test]
fn test_blob_without_marker_is_empty_array() {
    let fixture = parameter_fixture().value(1, 120, Stored::Blob(&[1, 2, 3, 4]));
    let (registry, mut source) = open_fixture(fixture);
    let tree = build_tree(&mut source, &registry, ROOT_TYPE).unwrap();
    let root = ValueExtractor::new().attach_values(&mut source, 1, &tree).unwrap();
    assert_eq!(
        root.find("Sizes").unwrap().value,
        Some(ParameterValue::Array(Vec::new()))
    );
}

#[test]
fn test_skip_blobs() {
    let fixture = parameter_fixture().value(1, 120, Stored::Array(&[1.0, 2.0]));
    let (registry, mut source) = open_fixture(fixture);
    let tree = build_tree(&mut source, &registry, ROOT_TYPE).unwrap();
    let root = ValueExtractor::new()
        .with_blobs(false)
        .attach_values(&mut source, 1, &tree)
        .unwrap();
    assert_eq!(root.find("Sizes").unwrap().value, None);
}

#[test]
fn test_extract_dispatch() {
    let extractor = ValueExtractor::new();
    let raw = RawValueRow {
        double: None,
        single: Some(1.5),
        int32: Some(4),
        int64: None,
        text: Some("2024-03-01 10:00:00".to_string()),
        ..Default::default()
    };

    assert_eq!(
        extractor.extract(DataTypeCode::Duration, &raw),
        Some(ParameterValue::Real(1.5))
    );
    assert_eq!(extractor.extract(DataTypeCode::Int64, &raw), None);
    assert_eq!(
        extractor.extract(DataTypeCode::Int64OrInt32, &raw),
        Some(ParameterValue::Integer(4))
    );
    // Date-times are passed through verbatim
    assert_eq!(
        extractor.extract(DataTypeCode::DateTime, &raw),
        Some(ParameterValue::Text("2024-03-01 10:00:00".to_string()))
    );
    assert_eq!(extractor.extract(DataTypeCode::Boolean, &raw), None);
    assert_eq!(extractor.extract(DataTypeCode::DoubleArray, &raw), None);
    assert_eq!(extractor.extract(DataTypeCode::Unrecognized(40), &raw), None);

    // Both integer columns filled: the 64-bit column wins
    let both = RawValueRow {
        int32: Some(7),
        int64: Some(1 << 40),
        ..Default::default()
    };
    assert_eq!(
        extractor.extract(DataTypeCode::Int64OrInt32, &both),
        Some(ParameterValue::Integer(1 << 40))
    );
    assert_eq!(
        extractor.extract(DataTypeCode::Int64, &both),
        Some(ParameterValue::Integer(1 << 40))
    );
    assert_eq!(
        extractor.extract(DataTypeCode::Int32, &both),
        Some(ParameterValue::Integer(7))
    );
}

#[test]
fn test_deep_chain_tree() {
    const DEPTH: i64 = 100_000;
    let registry = TypeRegistry::from_types([ParameterType {
        id: 1,
        guid: String::new(),
        urn: String::new(),
        friendly_name: "Level".to_string(),
        data_type: DataTypeCode::Int64,
        description: None,
        units_urn: None,
    }]);
    let rows = (0..DEPTH)
        .map(|id| TreeNodeRow {
            id,
            parameter_type_id: 1,
            parent_id: id.checked_sub(1),
            sibling_index: 0,
        })
        .collect();

    let tree = assemble_tree(1, rows, &registry).unwrap();
    assert_eq!(tree.len(), DEPTH as usize);

    let mut rows = HashMap::new();
    rows.insert(
        DEPTH - 1,
        RawValueRow {
            tree_node_id: DEPTH - 1,
            int64: Some(42),
            ..Default::default()
        },
    );
    let root = ValueExtractor::new().populate(&tree, &rows, &mut HashSet::new());
    assert_eq!(root.len(), DEPTH as usize);
    let deepest = root.walk().last().unwrap();
    assert_eq!(deepest.value, Some(ParameterValue::Integer(42)));
    assert!(deepest.is_leaf());
}

#[test]
fn test_tree_search() {
    let leaf = |name: &str| Parameter::new(name, format!("urn:{}", name));
    let root = leaf("root")
        .with_child(leaf("a").with_child(leaf("target").with_value(ParameterValue::Integer(1))))
        .with_child(leaf("target").with_value(ParameterValue::Integer(2)));

    // Shallow search sees only the immediate child
    assert_eq!(
        root.find_child("target").unwrap().value,
        Some(ParameterValue::Integer(2))
    );
    // Deep search is pre-order: the nested match comes first
    assert_eq!(
        root.find("target").unwrap().value,
        Some(ParameterValue::Integer(1))
    );
    assert_eq!(
        root.find_path(&["a", "target"]).unwrap().value,
        Some(ParameterValue::Integer(1))
    );
    assert!(root.find_child("missing").is_none());
    assert!(root.find("missing").is_none());
    assert_eq!(root.find("root").unwrap().name, "root");
}

#[test]
fn test_parameter_json() {
    let root = Parameter::new("Results", "urn:results")
        .with_child(Parameter::new("Sizes", "urn:sizes").with_value(ParameterValue::Array(vec![1.0, 2.0])));
    let json = serde_json::to_value(&root).unwrap();
    assert_eq!(json["children"][0]["value"], serde_json::json!([1.0, 2.0]));
    assert!(json.get("value").is_none());

    // JSON has no NaN, so non-finite elements are written as null
    let value = ParameterValue::Array(vec![1.0, f64::NAN]);
    assert_eq!(serde_json::to_value(&value).unwrap(), serde_json::json!([1.0, null]));
}

fn shuffled_rows(order: Vec<usize>) -> Vec<TreeNodeRow> {
    // Root 0 with children 1..=n; sibling index reversed against id.
    let n = order.len() as i64;
    let mut rows = vec![TreeNodeRow {
        id: 0,
        parameter_type_id: 1,
        parent_id: None,
        sibling_index: 0,
    }];
    for idx in order {
        let id = idx as i64 + 1;
        rows.push(TreeNodeRow {
            id,
            parameter_type_id: 1,
            parent_id: Some(if id > n / 2 && n > 1 { 1 } else { 0 }),
            sibling_index: n - id,
        });
    }
    rows
}

proptest! {
    #[test]
    fn prop_children_sorted_at_every_depth(
        order in Just((0..24usize).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let registry = TypeRegistry::from_types([ParameterType {
            id: 1,
            guid: String::new(),
            urn: String::new(),
            friendly_name: "Node".to_string(),
            data_type: DataTypeCode::None,
            description: None,
            units_urn: None,
        }]);
        let tree = assemble_tree(1, shuffled_rows(order), &registry).unwrap();
        prop_assert_eq!(tree.len(), 25);

        let mut stack = vec![&tree];
        let mut seen = HashSet::new();
        while let Some(node) = stack.pop() {
            prop_assert!(seen.insert(node.id));
            for pair in node.children.windows(2) {
                prop_assert!(pair[0].sibling_index < pair[1].sibling_index);
            }
            stack.extend(node.children.iter());
        }
    }
}
