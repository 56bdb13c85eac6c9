// crates/lmap-rs/tests/parsing.rs

use lmap_rs::{
    Field, FieldValue, LogicalNameMap, RegisterPath, SaveOptions, Target, TargetType,
    load_lmap_from_slice, load_lmap_from_str, save_lmap_to_string, save_lmap_to_string_with,
};
use std::fs;
use std::path::PathBuf;

/// Helper function to load a test file from the `tests/data/` directory.
fn load_test_file(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path.push(name);

    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read test file {:?}: {}", path, e))
}

fn path(s: &str) -> RegisterPath {
    RegisterPath::from(s)
}

#[test]
fn test_parse_sample_document() {
    let _ = env_logger::builder().is_test(true).try_init();
    let xml_content = load_test_file("sample.xlmap");
    let map = load_lmap_from_str(&xml_content).expect("Failed to parse sample.xlmap");

    // 1. One top-level module holding four entries, in document order.
    assert_eq!(map.root().len(), 1);
    let m1 = map.module(&path("/M1")).expect("M1 is missing");
    let names: Vec<&str> = m1.children.iter().map(|n| n.name()).collect();
    assert_eq!(names, ["R1", "R2", "C1", "V1"]);

    // 2. Each entry carries the fields of its type.
    assert_eq!(
        map.entry(&path("/M1/R1")).unwrap().target,
        Target::RedirectedRegister {
            target_device: "dev".into(),
            target_register: "reg".into(),
            target_start_index: Some(0),
            number_of_elements: Some(4),
        }
    );
    assert_eq!(
        map.entry(&path("/M1/R2")).unwrap().target,
        Target::RedirectedChannel {
            target_device: "dev".into(),
            target_register: "reg2".into(),
            target_channel: 3,
        }
    );
    assert_eq!(
        map.entry(&path("/M1/C1")).unwrap().target,
        Target::Constant { value: 42 }
    );
    assert_eq!(
        map.entry(&path("/M1/V1")).unwrap().target,
        Target::Variable { value: 7 }
    );
}

#[test]
fn test_parse_nested_document() {
    let xml_content = load_test_file("nested.xlmap");
    let map = load_lmap_from_str(&xml_content).expect("Failed to parse nested.xlmap");

    let top_level: Vec<&str> = map.root().children.iter().map(|n| n.name()).collect();
    assert_eq!(top_level, ["TopLevel", "Configuration", "Empty", "Scaled"]);

    let top = map.entry(&path("/TopLevel")).unwrap();
    assert_eq!(top.target_type(), TargetType::RedirectedRegister);
    assert_eq!(top.target.get(Field::TargetStartIndex), Some(FieldValue::Unset));
    assert_eq!(
        top.target.get(Field::TargetRegister),
        Some(FieldValue::Text("BOARD/WORD_FIRMWARE".into()))
    );

    assert!(map.module(&path("/Empty")).unwrap().is_empty());
    assert_eq!(
        map.entry(&path("/Configuration/Sub/counter")).unwrap().target,
        Target::Variable { value: -12 }
    );

    // The plugin section is not part of the model.
    let scaled = map.entry(&path("/Scaled")).unwrap();
    assert_eq!(scaled.target.get(Field::NumberOfElements), Some(FieldValue::Unsigned(20)));

    // Depth-first entry listing.
    let entries: Vec<String> = map.entries().map(|(p, _)| p.to_string()).collect();
    assert_eq!(
        entries,
        [
            "/TopLevel",
            "/Configuration/pi",
            "/Configuration/Sub/ChannelOne",
            "/Configuration/Sub/counter",
            "/Scaled",
        ]
    );
    assert_eq!(
        map.target_devices().into_iter().collect::<Vec<_>>(),
        ["PCIE2", "PCIE3"]
    );
}

#[test]
fn test_round_trip_fixtures() {
    for name in ["sample.xlmap", "nested.xlmap"] {
        let original = load_lmap_from_str(&load_test_file(name)).unwrap();
        let xml = save_lmap_to_string(&original).unwrap();
        let reparsed = load_lmap_from_str(&xml)
            .unwrap_or_else(|e| panic!("Failed to reparse {}: {}\n{}", name, e, xml));
        assert_eq!(original, reparsed, "Round trip changed {}", name);
    }
}

#[test]
fn test_round_trip_with_options() {
    let original = load_lmap_from_str(&load_test_file("nested.xlmap")).unwrap();
    let option_sets = [
        SaveOptions {
            indent_char: '\t',
            indent_size: 1,
            xml_declaration: true,
        },
        SaveOptions {
            indent_size: 0,
            ..SaveOptions::default()
        },
    ];
    for options in &option_sets {
        let xml = save_lmap_to_string_with(&original, options).unwrap();
        assert_eq!(original, load_lmap_from_str(&xml).unwrap(), "{:?}", options);
    }
}

#[test]
fn test_serialized_layout() {
    let mut map = LogicalNameMap::new();
    let m1 = map.create_module(&RegisterPath::root(), "M1").unwrap();
    let c1 = map.create_entry(&m1, "C1", TargetType::Constant).unwrap();
    map.set_field(&c1, Field::Value, 42i32).unwrap();

    let xml = save_lmap_to_string(&map).unwrap();
    let expected = "<logicalNameMap>\n  <module name=\"M1\">\n    <constant name=\"C1\">\n      <value>42</value>\n      <type>integer</type>\n    </constant>\n  </module>\n</logicalNameMap>\n";
    assert_eq!(xml, expected);
}

#[test]
fn test_markup_characters_are_escaped() {
    let mut map = LogicalNameMap::new();
    let m = map.create_module(&RegisterPath::root(), "A&B").unwrap();
    let r = map.create_entry(&m, "<less>", TargetType::RedirectedRegister).unwrap();
    map.set_field(&r, Field::TargetDevice, "sdm://./pci:pcieunis6;\"map\"").unwrap();
    map.set_field(&r, Field::TargetRegister, "a<b>&c").unwrap();

    let xml = save_lmap_to_string(&map).unwrap();
    assert!(!xml.contains("a<b>"), "{}", xml);
    assert_eq!(load_lmap_from_str(&xml).unwrap(), map);
}

#[test]
fn test_load_from_bytes() {
    let bytes = load_test_file("sample.xlmap").into_bytes();
    let map = load_lmap_from_slice(&bytes).unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map.entries().count(), 4);
}
