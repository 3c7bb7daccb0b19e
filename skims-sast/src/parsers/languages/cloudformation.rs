//! CloudFormation template adapter (YAML and JSON).
//!
//! Templates have no grammar in the tree-sitter stack, so the document is
//! deserialized into a value tree and re-emitted as a raw tree with the
//! labels `object`, `pair`, `key`, `array`, `string`, `number`, `boolean`
//! and `null`. Short-form intrinsic tags (`!Ref`, `!GetAtt`) become a
//! one-pair object keyed by their long form (`Ref`, `Fn::GetAtt`).

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use skims_core::errors::ParseError;

use crate::parsers::cache::hash_content;
use crate::parsers::traits::LanguageParser;
use crate::parsers::types::{Range, RawNode, RawTree};
use crate::parsers::ParseResult;
use crate::scanner::language_detect::Language;

/// Parses CloudFormation templates written in YAML or JSON.
#[derive(Debug, Clone, Copy)]
pub struct CloudFormationParser {
    language: Language,
}

impl CloudFormationParser {
    pub fn yaml() -> Self {
        Self {
            language: Language::Yaml,
        }
    }

    pub fn json() -> Self {
        Self {
            language: Language::Json,
        }
    }
}

impl LanguageParser for CloudFormationParser {
    fn language(&self) -> Language {
        self.language
    }

    fn parse(&self, source: &[u8], path: &Path) -> Result<ParseResult, ParseError> {
        let start = Instant::now();
        let malformed = |message: String| ParseError::MalformedDocument {
            path: path.to_path_buf(),
            message,
        };
        let text = std::str::from_utf8(source).map_err(|e| malformed(e.to_string()))?;

        let mut emitter = Emitter::new(text);
        match self.language {
            Language::Json => {
                let value: serde_json::Value =
                    serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
                emitter.json(&value, None, None);
            }
            _ => {
                let value: serde_yaml::Value =
                    serde_yaml::from_str(text).map_err(|e| malformed(e.to_string()))?;
                emitter.yaml(&value, None, None);
            }
        }

        Ok(ParseResult {
            file: path.display().to_string(),
            language: self.language,
            content_hash: hash_content(source),
            tree: Arc::new(emitter.tree),
            parse_time_us: start.elapsed().as_micros() as u64,
            error_count: 0,
            error_ranges: Vec::new(),
            has_errors: false,
        })
    }
}

/// Emits raw nodes in pre-order and recovers approximate source positions
/// by searching for scalar text forward from the last match.
struct Emitter<'a> {
    text: &'a str,
    offset: usize,
    tree: RawTree,
}

impl<'a> Emitter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            offset: 0,
            tree: RawTree::default(),
        }
    }

    fn locate(&mut self, needle: &str) -> Range {
        if needle.is_empty() {
            return self.range_at(self.offset, 0);
        }
        let found = self.text[self.offset..]
            .find(needle)
            .map(|i| self.offset + i)
            .or_else(|| self.text.find(needle));
        match found {
            Some(at) => {
                self.offset = at + needle.len();
                self.range_at(at, needle.len())
            }
            None => self.range_at(self.offset, 0),
        }
    }

    fn range_at(&self, at: usize, len: usize) -> Range {
        let (line, column) = line_col(self.text, at);
        let (end_line, end_column) = line_col(self.text, at + len);
        Range::new(line, column, end_line, end_column)
    }

    fn push(
        &mut self,
        label_type: &'static str,
        text: Option<String>,
        field: Option<&'static str>,
        parent: Option<u32>,
    ) -> u32 {
        let range = match &text {
            Some(t) => self.locate(t),
            None => self.range_at(self.offset, 0),
        };
        self.tree.push(
            RawNode {
                label_type,
                field,
                text,
                named: true,
                range,
                parent: None,
                children: Vec::new(),
            },
            parent,
        )
    }

    fn pair(&mut self, key: String, parent: u32) -> u32 {
        let pair = self.push("pair", None, None, Some(parent));
        self.push("key", Some(key), Some("key"), Some(pair));
        pair
    }

    fn yaml(&mut self, value: &serde_yaml::Value, field: Option<&'static str>, parent: Option<u32>) {
        use serde_yaml::Value;
        match value {
            Value::Null => {
                self.push("null", Some("null".to_string()), field, parent);
            }
            Value::Bool(b) => {
                self.push("boolean", Some(b.to_string()), field, parent);
            }
            Value::Number(n) => {
                self.push("number", Some(n.to_string()), field, parent);
            }
            Value::String(s) => {
                self.push("string", Some(s.clone()), field, parent);
            }
            Value::Sequence(items) => {
                let array = self.push("array", None, field, parent);
                for item in items {
                    self.yaml(item, None, Some(array));
                }
            }
            Value::Mapping(map) => {
                let object = self.push("object", None, field, parent);
                for (key, item) in map {
                    let key = yaml_key(key);
                    let pair = self.pair(key, object);
                    self.yaml(item, Some("value"), Some(pair));
                }
            }
            Value::Tagged(tagged) => {
                let object = self.push("object", None, field, parent);
                let pair = self.pair(intrinsic_name(&tagged.tag.to_string()), object);
                self.yaml(&tagged.value, Some("value"), Some(pair));
            }
        }
    }

    fn json(&mut self, value: &serde_json::Value, field: Option<&'static str>, parent: Option<u32>) {
        use serde_json::Value;
        match value {
            Value::Null => {
                self.push("null", Some("null".to_string()), field, parent);
            }
            Value::Bool(b) => {
                self.push("boolean", Some(b.to_string()), field, parent);
            }
            Value::Number(n) => {
                self.push("number", Some(n.to_string()), field, parent);
            }
            Value::String(s) => {
                self.push("string", Some(s.clone()), field, parent);
            }
            Value::Array(items) => {
                let array = self.push("array", None, field, parent);
                for item in items {
                    self.json(item, None, Some(array));
                }
            }
            Value::Object(map) => {
                let object = self.push("object", None, field, parent);
                for (key, item) in map {
                    let pair = self.pair(key.clone(), object);
                    self.json(item, Some("value"), Some(pair));
                }
            }
        }
    }
}

fn yaml_key(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// `!Ref` -> `Ref`, `!GetAtt` -> `Fn::GetAtt`.
fn intrinsic_name(tag: &str) -> String {
    let name = tag.trim_start_matches('!');
    if name == "Ref" || name == "Condition" {
        name.to_string()
    } else {
        format!("Fn::{name}")
    }
}

fn line_col(text: &str, at: usize) -> (u32, u32) {
    let at = at.min(text.len());
    let before = &text.as_bytes()[..at];
    let line = before.iter().filter(|b| **b == b'\n').count();
    let column = before
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(at, |nl| at - nl - 1);
    (line as u32, column as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_template_becomes_object_tree() {
        let source = b"Resources:\n  Bucket:\n    Type: AWS::S3::Bucket\n";
        let result = CloudFormationParser::yaml()
            .parse(source, Path::new("template.yaml"))
            .unwrap();
        let labels: Vec<&str> = result.tree.nodes.iter().map(|n| n.label_type).collect();
        assert_eq!(
            labels,
            vec!["object", "pair", "key", "object", "pair", "key", "object", "pair", "key", "string"]
        );
        let bucket_type = result.tree.nodes.last().unwrap();
        assert_eq!(bucket_type.text.as_deref(), Some("AWS::S3::Bucket"));
        assert_eq!(bucket_type.range.start.line, 2);
    }

    #[test]
    fn short_form_tags_use_long_names() {
        let source = b"Value: !Ref MyBucket\n";
        let result = CloudFormationParser::yaml()
            .parse(source, Path::new("t.yml"))
            .unwrap();
        let keys: Vec<&str> = result
            .tree
            .nodes
            .iter()
            .filter(|n| n.label_type == "key")
            .filter_map(|n| n.text.as_deref())
            .collect();
        assert_eq!(keys, vec!["Value", "Ref"]);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = CloudFormationParser::json()
            .parse(b"{\"a\": ", Path::new("t.json"))
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedDocument { .. }));
    }
}
