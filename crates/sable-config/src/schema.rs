use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::SableConfig;

/// JSON schema for `sable.toml`, for editor TOML integrations.
#[must_use]
pub fn json_schema() -> RootSchema {
    schema_for!(SableConfig)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lists_every_section() {
        let schema = serde_json::to_value(json_schema()).expect("serializable");
        let properties = schema["properties"].as_object().expect("properties");
        let mut names: Vec<&str> = properties.keys().map(String::as_str).collect();
        names.sort_unstable();
        assert_eq!(names, ["diagnostics", "logging", "quick_info", "refactor"]);
        assert_eq!(
            schema["definitions"]["DiagnosticLevel"]["enum"],
            serde_json::json!(["error", "warning", "off"])
        );
    }
}
