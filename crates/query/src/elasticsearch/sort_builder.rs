//! Elasticsearch sort assembler.
//!
//! Typed attributes sort natively. Untyped parameters sort through a script
//! that parses the stored keyword to the declared type; values that do not
//! parse sort last in either direction.

use serde_json::{Value, json};

use crate::error::{CompileError, CompileResult};
use crate::types::{OperatorFamily, ResolvedFields, Shape, SortColumn};

use super::script::Script;

/// Builds sort directives from sort columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct EsSortBuilder;

impl EsSortBuilder {
    /// Creates a sort builder.
    pub fn new() -> Self {
        Self
    }

    /// Builds the sort clause, preserving column order (first is primary).
    pub fn build(&self, columns: &[SortColumn], fields: &ResolvedFields) -> CompileResult<Vec<Value>> {
        columns
            .iter()
            .map(|column| self.build_column(column, fields))
            .collect()
    }

    /// Builds one sort directive.
    pub fn build_column(&self, column: &SortColumn, fields: &ResolvedFields) -> CompileResult<Value> {
        let field = column.field_ref();
        let resolved = fields.require(field.column_name())?;
        let order = if column.ascending() { "asc" } else { "desc" };
        let path = field.path();

        if field.shape() == Shape::Static {
            if !resolved.sortable {
                return Err(CompileError::validation(format!(
                    "column '{}' is full-text and cannot be sorted",
                    field
                )));
            }
            return Ok(json!({ path: { "order": order } }));
        }

        // unparsable or missing values sort last
        let missing = if column.ascending() { f64::MAX } else { f64::MIN };
        let (script, sort_type) = match resolved.val_type.family() {
            OperatorFamily::Numeric => (Script::sort_number(&path, missing), "number"),
            OperatorFamily::Date => (Script::sort_instant(&path, missing), "number"),
            OperatorFamily::String | OperatorFamily::Boolean => {
                (Script::sort_text(&path, ""), "string")
            }
        };

        Ok(json!({
            "_script": {
                "type": sort_type,
                "script": script.to_json(),
                "order": order
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StaticSchema;
    use crate::types::{ResolvedField, ValueTypeKind};

    fn fields() -> ResolvedFields {
        [
            ResolvedField::new("name", ValueTypeKind::String, false),
            ResolvedField::new("42", ValueTypeKind::Float, false),
            ResolvedField::new("43", ValueTypeKind::Enum, false),
            ResolvedField::new("44", ValueTypeKind::Date, false),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_static_sort() {
        let sort = EsSortBuilder::new()
            .build(&[SortColumn::new("name", false).unwrap()], &fields())
            .unwrap();
        assert_eq!(sort, vec![json!({"name": {"order": "desc"}})]);
    }

    #[test]
    fn test_dynamic_numeric_sort_is_scripted() {
        let sort = EsSortBuilder::new()
            .build_column(&SortColumn::new("42", true).unwrap(), &fields())
            .unwrap();
        assert_eq!(sort["_script"]["type"], json!("number"));
        assert_eq!(sort["_script"]["order"], json!("asc"));
        assert_eq!(sort["_script"]["script"]["params"]["field"], json!("parameters.42"));
        assert_eq!(sort["_script"]["script"]["params"]["missing"], json!(f64::MAX));
        let source = sort["_script"]["script"]["source"].as_str().unwrap();
        assert!(source.contains("catch (Exception e)"));
    }

    #[test]
    fn test_dynamic_string_and_date_sort() {
        let builder = EsSortBuilder::new();
        let text = builder
            .build_column(&SortColumn::new("43", false).unwrap(), &fields())
            .unwrap();
        assert_eq!(text["_script"]["type"], json!("string"));
        assert_eq!(text["_script"]["order"], json!("desc"));

        let date = builder
            .build_column(&SortColumn::new("44", false).unwrap(), &fields())
            .unwrap();
        assert_eq!(date["_script"]["type"], json!("number"));
        assert_eq!(date["_script"]["script"]["params"]["missing"], json!(f64::MIN));
    }

    #[test]
    fn test_order_preserved() {
        let columns = [
            SortColumn::new("42", true).unwrap(),
            SortColumn::new("name", true).unwrap(),
        ];
        let sort = EsSortBuilder::new().build(&columns, &fields()).unwrap();
        assert!(sort[0].get("_script").is_some());
        assert!(sort[1].get("name").is_some());
    }

    #[test]
    fn test_full_text_attribute_not_sortable() {
        let schema = StaticSchema::default();
        let fields: ResolvedFields = ["description", "name"]
            .into_iter()
            .filter_map(|name| schema.resolve(name))
            .collect();

        let err = EsSortBuilder::new()
            .build(&[SortColumn::new("description", true).unwrap()], &fields)
            .unwrap_err();
        assert!(matches!(err, CompileError::Validation { .. }));

        let sort = EsSortBuilder::new()
            .build(&[SortColumn::new("name", true).unwrap()], &fields)
            .unwrap();
        assert_eq!(sort, vec![json!({"name": {"order": "asc"}})]);
    }

    #[test]
    fn test_unknown_sort_column() {
        let err = EsSortBuilder::new()
            .build(&[SortColumn::new("missing", true).unwrap()], &fields())
            .unwrap_err();
        assert!(matches!(err, CompileError::BadColumn { .. }));
    }
}
