use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use sable_workspace::Project;

/// Reads every `.cs` file under `dir` into `name -> text`.
///
/// Names are relative to `dir` and always use `/`, so `Lib/Text.cs` is the same document
/// on every platform.
pub fn read_sources(dir: &Path) -> BTreeMap<String, String> {
    let mut sources = BTreeMap::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current)
            .unwrap_or_else(|err| panic!("cannot read {}: {err}", current.display()));
        for entry in entries {
            let path = entry
                .unwrap_or_else(|err| panic!("cannot list {}: {err}", current.display()))
                .path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            if path.extension().map_or(true, |ext| ext != "cs") {
                continue;
            }
            let name = path
                .strip_prefix(dir)
                .unwrap_or(&path)
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let text = fs::read_to_string(&path)
                .unwrap_or_else(|err| panic!("cannot read {}: {err}", path.display()));
            sources.insert(name, text);
        }
    }
    sources
}

/// Builds a [`Project`] from the `.cs` files of a fixture directory, in name order.
pub fn load_project_dir(dir: &Path) -> Project {
    Project::from_sources(read_sources(dir))
        .unwrap_or_else(|err| panic!("fixture {} is not a project: {err}", dir.display()))
}

/// Checks that every document of `project` matches the file of the same name under
/// `expected`, and that `expected` holds no extra files.
///
/// With `BLESS=1` the directory is rewritten from `project` instead.
pub fn assert_project_matches_dir(project: &Project, expected: &Path) {
    let actual: BTreeMap<String, String> = project
        .documents()
        .map(|doc| (doc.name().to_string(), doc.text().to_string()))
        .collect();

    if bless_enabled() {
        write_sources(expected, &actual);
        return;
    }
    assert!(
        expected.is_dir(),
        "missing expected fixture dir {} (run with `BLESS=1` to write it)",
        expected.display()
    );

    let wanted = read_sources(expected);
    for (name, text) in &actual {
        match wanted.get(name) {
            Some(want) => assert_eq!(text, want, "document `{name}` differs"),
            None => panic!("document `{name}` has no file under {}", expected.display()),
        }
    }
    if let Some(extra) = wanted.keys().find(|name| !actual.contains_key(*name)) {
        panic!("{}/{extra} is not a project document", expected.display());
    }
}

fn bless_enabled() -> bool {
    env::var("BLESS").is_ok_and(|val| {
        let val = val.trim();
        !(val.is_empty() || val == "0" || val.eq_ignore_ascii_case("false"))
    })
}

fn write_sources(dir: &Path, sources: &BTreeMap<String, String>) {
    if dir.exists() {
        fs::remove_dir_all(dir)
            .unwrap_or_else(|err| panic!("cannot clear {}: {err}", dir.display()));
    }
    for (name, text) in sources {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|err| panic!("cannot create {}: {err}", parent.display()));
        }
        fs::write(&path, text)
            .unwrap_or_else(|err| panic!("cannot write {}: {err}", path.display()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_are_named_relative_to_the_fixture_root() {
        let root = env::temp_dir().join(format!("sable-fixture-fs-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("Lib")).unwrap();
        fs::write(root.join("Program.cs"), "class P { }").unwrap();
        fs::write(root.join("Lib/Text.cs"), "class T { }").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();

        let project = load_project_dir(&root);
        let names: Vec<_> = project.documents().map(|d| d.name().to_string()).collect();
        assert_eq!(names, ["Lib/Text.cs", "Program.cs"]);

        fs::remove_file(root.join("notes.txt")).unwrap();
        assert_project_matches_dir(&project, &root);
        fs::remove_dir_all(&root).unwrap();
    }
}
