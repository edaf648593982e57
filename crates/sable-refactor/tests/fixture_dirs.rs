use std::path::{Path, PathBuf};

use sable_core::CancellationToken;
use sable_refactor::{apply_create_custom_delegate, offer_create_custom_delegate};
use sable_syntax::ast::{self, AstNode};
use sable_test_utils::{assert_project_matches_dir, load_project_dir};

fn fixture_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn func_parameter_forwarded_across_namespaces() {
    let dir = fixture_dir("func_forwarder");
    let project = load_project_dir(&dir.join("before"));
    let target = project.document_by_name("Formatter.cs").expect("Formatter.cs");
    let span = target
        .syntax()
        .descendants()
        .find_map(ast::Parameter::cast)
        .and_then(|p| p.name_token())
        .expect("parameter")
        .text_range();

    let token = CancellationToken::new();
    let offer = offer_create_custom_delegate(&project, target.id(), span, &token)
        .expect("not cancelled")
        .expect("offered");
    let next = apply_create_custom_delegate(&project, &offer, &token).expect("applied");
    assert_project_matches_dir(&next, &dir.join("after"));
}
