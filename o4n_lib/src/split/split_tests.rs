// Copyright 2024 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use std::fs;
use std::path::Path;
use std::time::Instant;

use crate::error::Error;
use crate::split::*;

const CONFIG: &str = "hostname R1
!
interface GigabitEthernet0/1
 description UPLINK
 no shutdown
!
interface GigabitEthernet0/2
 shutdown
!
router ospf 1
 network 10.0.0.0 0.255.255.255 area 0
!
";

#[test]
fn blocks_end_at_marker() {
    let blocks = find_configuration_blocks(CONFIG, "interface", "!").unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].id, "GigabitEthernet0/1");
    assert_eq!(
        blocks[0].text,
        "interface GigabitEthernet0/1\n description UPLINK\n no shutdown\n!"
    );
    assert_eq!(&CONFIG[blocks[1].start..blocks[1].end], blocks[1].text);
    assert_eq!(blocks[1].text, "interface GigabitEthernet0/2\n shutdown\n!");

    let text = "interface A\n x\n! end of A\n";
    let blocks = find_configuration_blocks(text, "interface", "!").unwrap();
    assert_eq!(blocks[0].text, "interface A\n x\n!");
}

#[test]
fn next_start_ends_block() {
    let text = "interface A\n x\ninterface B\n y\n!\n";
    let blocks = find_configuration_blocks(text, "interface", "!").unwrap();
    assert_eq!(
        blocks
            .iter()
            .map(|b| (b.id.as_str(), b.text.as_str()))
            .collect::<Vec<_>>(),
        vec![("A", "interface A\n x\n"), ("B", "interface B\n y\n!")]
    );
}

#[test]
fn start_inside_a_line_does_not_end_block() {
    let text = "interface A\n description interface to core\n!\n";
    let blocks = find_configuration_blocks(text, "interface", "!").unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].text, "interface A\n description interface to core\n!");
}

#[test]
fn edge_blocks() {
    // terminator straight after the header
    let blocks = find_configuration_blocks("router bgp 65000\n!\n", "router", "!").unwrap();
    assert_eq!(blocks[0].id, "bgp 65000");
    assert_eq!(blocks[0].text, "router bgp 65000\n!");

    let blocks = find_configuration_blocks("interface   \n x\n!\n", "interface", "!").unwrap();
    assert_eq!(blocks[0].id, "");

    assert!(find_configuration_blocks("interface A\n x\n", "interface", "!")
        .unwrap()
        .is_empty());
    assert!(find_configuration_blocks(CONFIG, "vlan", "!").unwrap().is_empty());
    assert!(matches!(
        find_configuration_blocks(CONFIG, "", "!"),
        Err(Error::InvalidOption(_))
    ));
}

#[test]
fn filenames() {
    assert_eq!(sanitize_filename("ip access-list"), "ip_access-list");
    assert_eq!(sanitize_filename("Vlan10.100"), "Vlan10.100");
    assert_eq!(sanitize_filename("a:b*c"), "a_b_c");
}

#[test]
fn keyword_selects_blocks() {
    let blocks = find_configuration_blocks(CONFIG, "interface", "!").unwrap();
    let mut options = SplitOptions::new("interface", "R1");
    assert_eq!(matching_blocks(&blocks, &options).len(), 2);
    options.keyword = "UPLINK".to_string();
    assert_eq!(matching_blocks(&blocks, &options), vec!["GigabitEthernet0/1"]);
}

#[test]
fn extract_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let blocks = find_configuration_blocks(CONFIG, "interface", "!").unwrap();
    let mut options = SplitOptions::new("interface", "R1");
    options.path = dir.path().join("sections");
    let report = extract_matching_blocks(&blocks, &options).unwrap();

    let expected = dir
        .path()
        .join("sections")
        .join("R1_interface_GigabitEthernet0_1.txt");
    assert_eq!(report.file_names.len(), 2);
    assert_eq!(report.file_names[0], expected);
    assert_eq!(fs::read_to_string(&expected).unwrap(), blocks[0].text);
    assert_eq!(
        report.sections_list[1],
        Section {
            instance_name: "GigabitEthernet0/2".to_string(),
            filename: report.file_names[1].clone(),
            section_text: vec![
                "interface GigabitEthernet0/2".to_string(),
                " shutdown".to_string(),
                "!".to_string()
            ],
        }
    );
}

#[test]
fn split_writes_files() {
    let dir = tempfile::tempdir().unwrap();
    let file = temp_file::with_contents(CONFIG.as_bytes());
    let mut options = SplitOptions::new("interface", "R1");
    options.path = dir.path().to_path_buf();
    options.extension = "cfg".to_string();
    let output = split_config(file.path(), &options, false, Instant::now()).unwrap();
    assert!(output.changed);
    assert_eq!(output.msg, "Successfully extracted 2 configuration blocks");
    assert!(dir.path().join("R1_interface_GigabitEthernet0_2.cfg").is_file());

    let value = serde_json::to_value(&output).unwrap();
    assert_eq!(value["content"]["sections_list"][0]["instance_name"], "GigabitEthernet0/1");
    assert!(value["content"]["Total_execution_time"].is_string());
    assert!(value["content"].get("would_process_blocks").is_none());
}

#[test]
fn check_mode_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let file = temp_file::with_contents(CONFIG.as_bytes());
    let mut options = SplitOptions::new("interface", "R1");
    options.path = dir.path().join("out");
    let output = split_config(file.path(), &options, true, Instant::now()).unwrap();
    assert!(!output.changed);
    assert_eq!(output.msg, "Check mode: Found 2 matching blocks");
    assert_eq!(
        output.content.would_process_blocks,
        Some(vec![
            "GigabitEthernet0/1".to_string(),
            "GigabitEthernet0/2".to_string()
        ])
    );
    assert!(output.content.file_names.is_none());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn nothing_to_split() {
    let dir = tempfile::tempdir().unwrap();
    let file = temp_file::with_contents(CONFIG.as_bytes());
    let mut options = SplitOptions::new("vlan", "R1");
    options.path = dir.path().to_path_buf();
    let output = split_config(file.path(), &options, false, Instant::now()).unwrap();
    assert!(!output.changed);
    assert_eq!(output.msg, "No configuration blocks found matching 'vlan'");

    let mut options = SplitOptions::new("interface", "R1");
    options.path = dir.path().to_path_buf();
    options.keyword = "BACKUP".to_string();
    let output = split_config(file.path(), &options, false, Instant::now()).unwrap();
    assert!(!output.changed);
    assert_eq!(output.msg, "No blocks contain keyword 'BACKUP'");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn bad_input_file() {
    let options = SplitOptions::new("interface", "R1");
    let empty = temp_file::empty();
    assert!(matches!(
        split_config(empty.path(), &options, true, Instant::now()),
        Err(Error::EmptyFile(_))
    ));
    assert!(matches!(
        split_config(Path::new("/no/such/config"), &options, true, Instant::now()),
        Err(Error::Read { .. })
    ));
}
