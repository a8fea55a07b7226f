//! Painless scripts for untyped parameter values.
//!
//! Dynamic parameters are stored as keywords, so ordering and
//! case-insensitive matching happen in a script that parses each stored
//! value to the declared type. A value that fails to parse never matches
//! and never fails the query.
//!
//! Script sources come from fixed templates; the only substituted text is
//! drawn from closed enums. The field path and every user-supplied value are
//! passed through `params`.

use serde_json::{Map, Value, json};

use super::clause::RangeOp;

const LANG: &str = "painless";

/// Case-insensitive text predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPattern {
    Contains,
    StartsWith,
    EndsWith,
}

impl TextPattern {
    fn method(self) -> &'static str {
        match self {
            TextPattern::Contains => "contains",
            TextPattern::StartsWith => "startsWith",
            TextPattern::EndsWith => "endsWith",
        }
    }
}

/// Converts a stored value `v` to epoch millis; plain dates are taken at UTC midnight.
const PARSE_INSTANT: &str = "String s = v.toString(); \
long stored = s.length() == 10 \
? LocalDate.parse(s).atStartOfDay(ZoneOffset.UTC).toInstant().toEpochMilli() \
: ZonedDateTime.parse(s).toInstant().toEpochMilli();";

const PARSE_NUMBER: &str = "double stored = Double.parseDouble(v.toString());";

/// A script with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    source: String,
    params: Map<String, Value>,
}

impl Script {
    fn new(source: String, field: &str) -> Self {
        let mut params = Map::new();
        params.insert("field".to_string(), json!(field));
        Self { source, params }
    }

    fn param(mut self, name: &str, value: Value) -> Self {
        self.params.insert(name.to_string(), value);
        self
    }

    /// Matches documents where any stored value, parsed as a number, satisfies `op value`.
    pub fn compare_number(field: &str, op: RangeOp, value: Value) -> Self {
        Self::new(compare_source(PARSE_NUMBER, op), field).param("value", value)
    }

    /// Matches documents where any stored value, parsed as an instant, satisfies `op millis`.
    pub fn compare_instant(field: &str, op: RangeOp, millis: i64) -> Self {
        Self::new(compare_source(PARSE_INSTANT, op), field).param("value", json!(millis))
    }

    /// Matches documents where any stored value contains/starts/ends with `needle`, ignoring case.
    pub fn match_text(field: &str, pattern: TextPattern, needle: &str) -> Self {
        let source = format!(
            "if (!doc.containsKey(params.field)) {{ return false; }} \
for (def v : doc[params.field]) {{ \
if (v.toString().toLowerCase().{}(params.value)) {{ return true; }} \
}} \
return false;",
            pattern.method()
        );
        Self::new(source, field).param("value", json!(needle.to_lowercase()))
    }

    /// Sort key: first stored value parsed as a number, or `missing`.
    pub fn sort_number(field: &str, missing: f64) -> Self {
        Self::new(sort_source(PARSE_NUMBER, "stored"), field).param("missing", json!(missing))
    }

    /// Sort key: first stored value parsed as epoch millis, or `missing`.
    pub fn sort_instant(field: &str, missing: f64) -> Self {
        Self::new(sort_source(PARSE_INSTANT, "(double) stored"), field)
            .param("missing", json!(missing))
    }

    /// Sort key: first stored value as text, or `missing`.
    pub fn sort_text(field: &str, missing: &str) -> Self {
        let source = "if (doc.containsKey(params.field) && doc[params.field].size() > 0) { \
return doc[params.field].value.toString(); \
} \
return params.missing;"
            .to_string();
        Self::new(source, field).param("missing", json!(missing))
    }

    /// Returns the script source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the script parameters.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// `{"source", "lang", "params"}`
    pub fn to_json(&self) -> Value {
        json!({
            "source": self.source,
            "lang": LANG,
            "params": self.params,
        })
    }

    /// Wraps the script in a script query clause.
    pub fn into_query(self) -> Value {
        json!({ "script": { "script": self.to_json() } })
    }
}

fn compare_source(parse: &str, op: RangeOp) -> String {
    format!(
        "if (!doc.containsKey(params.field)) {{ return false; }} \
for (def v : doc[params.field]) {{ \
try {{ {} if (stored {} params.value) {{ return true; }} }} catch (Exception e) {{ }} \
}} \
return false;",
        parse,
        op.symbol()
    )
}

fn sort_source(parse: &str, result: &str) -> String {
    format!(
        "if (doc.containsKey(params.field)) {{ \
for (def v : doc[params.field]) {{ \
try {{ {} return {}; }} catch (Exception e) {{ }} \
}} \
}} \
return params.missing;",
        parse, result
    )
}
