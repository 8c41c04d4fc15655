// Tests for result, rule catalogue and profile rendering
//
// Documents are run through the built-in validator so the rendered issues
// match what the binary prints.

use super::*;
use gxval_core::{validate, RuleRegistry};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

const BROKEN: &str =
    "statement:\n  fields:\n    meters:\n      prompt:\n        type: str\n    charges: {}\n";

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, quiet, Box::new(buffer.clone()));
    (writer, buffer)
}

#[test]
fn test_human_result_lists_issues_with_lines() {
    let result = validate(BROKEN, None).unwrap();
    let text = OutputFormat::Human
        .format_validation_result(&result, false)
        .unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "✗ Validation failed (2 errors, 0 warnings)");
    assert!(lines[1].starts_with("[GXVAL"));
    assert!(text.contains("(line 4)"));
    assert!(text.contains("    → "));
}

#[test]
fn test_human_result_names_profile() {
    let result = validate("statement: {}\n", Some("statement_only")).unwrap();
    let text = OutputFormat::Human
        .format_validation_result(&result, false)
        .unwrap();
    assert!(text.contains("\nProfile: statement_only\n"));
}

#[test]
fn test_json_result_matches_core_rendering() {
    let result = validate(BROKEN, None).unwrap();
    let text = OutputFormat::Json
        .format_validation_result(&result, false)
        .unwrap();
    assert_eq!(text, result.to_json());

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["error_count"], 2);
    assert!(value["issues"][0]["path"].is_array());
}

#[test]
fn test_yaml_result() {
    let result = validate(BROKEN, None).unwrap();
    let text = OutputFormat::Yaml
        .format_validation_result(&result, false)
        .unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
    assert_eq!(value["success"], serde_yaml::Value::Bool(false));
    assert_eq!(value["profile"], serde_yaml::Value::Null);
}

#[test]
fn test_rule_catalogue_covers_every_code() {
    let rules: Vec<RuleEntry> = IssueCode::all().map(RuleEntry::from).collect();
    let text = OutputFormat::Human.format_rules(&rules, false).unwrap();
    assert_eq!(text.lines().count(), IssueCode::all().count());
    assert!(text.lines().next().unwrap().starts_with("GXVAL001  error"));
    assert!(text.contains("GXVAL151  warning  core"));

    let json = OutputFormat::Json.format_rules(&rules, false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["code"], "GXVAL001");
    assert_eq!(value[0]["severity"], "error");
    assert_eq!(value[0]["phase"], "syntax");
}

#[test]
fn test_profile_list() {
    let registry = RuleRegistry::with_builtin_profiles().unwrap();
    let profiles: Vec<ProfileEntry> = registry.profiles().map(ProfileEntry::from).collect();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].name, "statement_only");
    assert_eq!(profiles[0].version.as_deref(), Some("1.0.0"));
    assert!(profiles[0].rules[0].starts_with("GXVAL201: "));

    let text = OutputFormat::Human.format_profiles(&profiles, false).unwrap();
    assert!(text.starts_with("statement_only (1.0.0)\n"));
    assert_eq!(
        OutputFormat::Human.format_profiles(&[], false).unwrap(),
        "No profiles registered\n"
    );
}

#[test]
fn test_quiet_human_output_is_summary_only() {
    let result = validate(BROKEN, None).unwrap();
    let (mut out, buffer) = writer(OutputFormat::Human, true);
    out.validation_result(&result).unwrap();
    out.info("hidden").unwrap();
    assert_eq!(
        buffer.contents(),
        "✗ Validation failed (2 errors, 0 warnings)\n"
    );
}

#[test]
fn test_quiet_machine_output_is_kept() {
    let result = validate(BROKEN, None).unwrap();
    let (mut out, buffer) = writer(OutputFormat::JsonPretty, true);
    out.validation_result(&result).unwrap();
    assert_eq!(buffer.contents(), format!("{}\n", result.to_json_pretty()));
}

#[test]
fn test_info_only_in_human_format() {
    let (mut out, buffer) = writer(OutputFormat::Json, false);
    out.info("Validating a.yaml").unwrap();
    assert_eq!(buffer.contents(), "");

    let (mut out, buffer) = writer(OutputFormat::Human, false);
    out.info("Validating a.yaml").unwrap();
    assert_eq!(buffer.contents(), "INFO: Validating a.yaml\n");
}
