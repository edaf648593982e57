use serde::de::DeserializeOwned;

/// Non-fatal findings from loading a config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiagnostics {
    /// Dotted paths of keys the schema does not know, sorted.
    pub unknown_keys: Vec<String>,
    pub warnings: Vec<ConfigWarning>,
}

impl ConfigDiagnostics {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unknown_keys.is_empty() && self.warnings.is_empty()
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    LoggingLevelInvalid { value: String },
}

pub(crate) fn deserialize_toml_with_unknown_keys<T: DeserializeOwned>(
    text: &str,
) -> Result<(T, Vec<String>), toml::de::Error> {
    let mut unknown = Vec::<String>::new();
    let deserializer = toml::de::Deserializer::new(text);
    let value = serde_ignored::deserialize(deserializer, |path| {
        unknown.push(normalize_path(&path));
    })?;
    unknown.sort();
    unknown.dedup();
    Ok((value, unknown))
}

/// `serde_ignored` renders root paths with a leading `.`.
fn normalize_path(path: &serde_ignored::Path<'_>) -> String {
    path.to_string().trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn nested_unknown_keys_use_full_paths() {
        #[derive(Debug, Deserialize)]
        struct Root {
            #[allow(dead_code)]
            #[serde(default)]
            table: Table,
        }

        #[derive(Debug, Default, Deserialize)]
        struct Table {
            #[allow(dead_code)]
            #[serde(default)]
            known: bool,
        }

        let (_, unknown) = deserialize_toml_with_unknown_keys::<Root>(
            "top = 1\n[table]\nknown = true\ntypo = 2\n",
        )
        .expect("parse");
        assert_eq!(unknown, ["table.typo", "top"]);
    }
}
