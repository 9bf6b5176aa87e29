use std::collections::BTreeMap;
use std::ops::Range;

use crate::foundation::error::{HandvizError, HandvizResult};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Text(Range<usize>),
    Slot(String),
}

/// Host script with `{{NAME}}` placeholders.
///
/// A template is immutable: [`ScriptTemplate::render`] produces a new [`HostScript`] and
/// never touches the template source, so one template serves any number of runs.
#[derive(Clone, Debug)]
pub struct ScriptTemplate {
    name: String,
    source: String,
    segments: Vec<Segment>,
}

impl ScriptTemplate {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> HandvizResult<Self> {
        let name = name.into();
        let source = source.into();
        let segments = split_segments(&name, &source)?;
        Ok(Self {
            name,
            source,
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of first appearance.
    pub fn slots(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for seg in &self.segments {
            if let Segment::Slot(s) = seg
                && !out.contains(&s.as_str())
            {
                out.push(s);
            }
        }
        out
    }

    /// Substitute every placeholder. Unbound placeholders and bindings that match no
    /// placeholder are both errors.
    pub fn render(&self, bindings: &SlotBindings) -> HandvizResult<HostScript> {
        let slots = self.slots();
        if let Some(unknown) = bindings.0.keys().find(|k| !slots.contains(&k.as_str())) {
            return Err(HandvizError::template(format!(
                "template '{}' has no slot '{unknown}'",
                self.name
            )));
        }

        let mut out = String::with_capacity(self.source.len() + 256);
        for seg in &self.segments {
            match seg {
                Segment::Text(r) => out.push_str(&self.source[r.clone()]),
                Segment::Slot(slot) => {
                    let value = bindings.0.get(slot).ok_or_else(|| {
                        HandvizError::template(format!(
                            "template '{}': slot '{slot}' is not bound",
                            self.name
                        ))
                    })?;
                    write_py_literal(&mut out, value);
                }
            }
        }

        Ok(HostScript {
            name: self.name.clone(),
            source: out,
        })
    }
}

fn split_segments(name: &str, source: &str) -> HandvizResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut cursor = 0usize;
    while let Some(rel) = source[cursor..].find("{{") {
        let open = cursor + rel;
        let close = source[open + 2..].find("}}").map(|i| open + 2 + i).ok_or_else(|| {
            HandvizError::template(format!("template '{name}': unterminated '{{{{' at byte {open}"))
        })?;
        let slot = &source[open + 2..close];
        if !is_slot_name(slot) {
            return Err(HandvizError::template(format!(
                "template '{name}': invalid slot name '{slot}' at byte {open}"
            )));
        }
        if open > cursor {
            segments.push(Segment::Text(cursor..open));
        }
        segments.push(Segment::Slot(slot.to_string()));
        cursor = close + 2;
    }
    if cursor < source.len() {
        segments.push(Segment::Text(cursor..source.len()));
    }
    Ok(segments)
}

fn is_slot_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Values bound to template slots, kept as JSON until rendering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlotBindings(BTreeMap<String, serde_json::Value>);

impl SlotBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, slot: &str, value: impl serde::Serialize) -> HandvizResult<()> {
        let value = serde_json::to_value(value).map_err(|e| {
            HandvizError::template(format!("slot '{slot}' cannot be encoded: {e}"))
        })?;
        self.0.insert(slot.to_string(), value);
        Ok(())
    }

    pub fn get(&self, slot: &str) -> Option<&serde_json::Value> {
        self.0.get(slot)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// JSON strings and numbers are valid Python literals with the same meaning; only the
// keyword constants differ.
fn write_py_literal(out: &mut String, value: &serde_json::Value) {
    use serde_json::Value;
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&Value::String(s.clone()).to_string()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_py_literal(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&Value::String(k.clone()).to_string());
                out.push_str(": ");
                write_py_literal(out, v);
            }
            out.push('}');
        }
    }
}

/// A fully parameterized script, owned by exactly one host run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostScript {
    pub name: String,
    pub source: String,
}

impl HostScript {
    pub fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = "LABEL = {{LABEL}}\nHAND = {{HAND}}\nFLAG = {{FLAG}}\nAGAIN = {{LABEL}}\n";

    fn bindings(label: &str, flag: bool) -> SlotBindings {
        let mut b = SlotBindings::new();
        b.set("LABEL", label).unwrap();
        b.set("HAND", "Left").unwrap();
        b.set("FLAG", flag).unwrap();
        b
    }

    #[test]
    fn slots_are_listed_once_in_order() {
        let t = ScriptTemplate::new("t", SRC).unwrap();
        assert_eq!(t.slots(), vec!["LABEL", "HAND", "FLAG"]);
    }

    #[test]
    fn render_substitutes_python_literals() {
        let t = ScriptTemplate::new("t", SRC).unwrap();
        let s = t.render(&bindings("a", true)).unwrap();
        assert_eq!(
            s.source(),
            "LABEL = \"a\"\nHAND = \"Left\"\nFLAG = True\nAGAIN = \"a\"\n"
        );
    }

    #[test]
    fn render_leaves_template_untouched_between_runs() {
        let t = ScriptTemplate::new("t", SRC).unwrap();
        let before = t.source().to_string();

        let first = t.render(&bindings("first_label", true)).unwrap();
        assert_eq!(t.source(), before);

        let second = t.render(&bindings("b", false)).unwrap();
        assert_eq!(t.source().as_bytes(), before.as_bytes());
        assert!(first.source().contains("first_label"));
        assert!(!second.source().contains("first_label"));
        assert!(second.source().contains("FLAG = False"));
    }

    #[test]
    fn unbound_and_unknown_slots_are_errors() {
        let t = ScriptTemplate::new("t", SRC).unwrap();

        let mut partial = SlotBindings::new();
        partial.set("LABEL", "a").unwrap();
        let err = t.render(&partial).unwrap_err();
        assert!(err.to_string().contains("'HAND' is not bound"));

        let mut extra = bindings("a", true);
        extra.set("BOGUS", 1).unwrap();
        let err = t.render(&extra).unwrap_err();
        assert!(err.to_string().contains("no slot 'BOGUS'"));
    }

    #[test]
    fn strings_are_escaped() {
        let t = ScriptTemplate::new("t", "P = {{P}}").unwrap();
        let mut b = SlotBindings::new();
        b.set("P", r#"C:\out\"x".stl"#).unwrap();
        let s = t.render(&b).unwrap();
        assert_eq!(s.source(), r#"P = "C:\\out\\\"x\".stl""#);
    }

    #[test]
    fn nested_values_render_as_python() {
        let t = ScriptTemplate::new("t", "V = {{V}}").unwrap();
        let mut b = SlotBindings::new();
        b.set(
            "V",
            serde_json::json!({"bone": "a", "euler_deg": [1.5, 0.0, -2.0], "hidden": null}),
        )
        .unwrap();
        let s = t.render(&b).unwrap();
        assert_eq!(
            s.source(),
            r#"V = {"bone": "a", "euler_deg": [1.5, 0.0, -2.0], "hidden": None}"#
        );
    }

    #[test]
    fn malformed_placeholders_are_rejected() {
        assert!(ScriptTemplate::new("t", "X = {{X").is_err());
        assert!(ScriptTemplate::new("t", "X = {{lower}}").is_err());
        assert!(ScriptTemplate::new("t", "X = {{}}").is_err());
    }
}
