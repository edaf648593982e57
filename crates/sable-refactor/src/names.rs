//! Parameter names recovered from `/*name*/` annotations on type arguments.

use sable_syntax::ast::{self, AstNode};
use sable_syntax::{SyntaxKind, SyntaxToken};

/// The name written as a block comment right after `type_argument`, as in
/// `Action<string /*firstName*/>`.
///
/// Only trivia up to the end of the line count. With zero or several block comments the
/// annotation is ambiguous and `None` is returned.
pub fn name_from_annotation(type_argument: &ast::Type) -> Option<String> {
    let comments: Vec<SyntaxToken> = trailing_trivia(type_argument)
        .into_iter()
        .filter(|tok| tok.kind() == SyntaxKind::MultiLineComment)
        .collect();
    match comments.as_slice() {
        [comment] => Some(comment_content(comment.text())),
        _ => None,
    }
}

/// Recovered name of the type argument at `position`, or `fallback`.
pub fn parameter_name(type_arguments: &[ast::Type], position: usize, fallback: &str) -> String {
    type_arguments
        .get(position)
        .and_then(name_from_annotation)
        .unwrap_or_else(|| fallback.to_string())
}

fn trailing_trivia(node: &ast::Type) -> Vec<SyntaxToken> {
    let mut out = Vec::new();
    let mut next = node.syntax().next_sibling_or_token();
    while let Some(element) = next {
        let Some(token) = element.as_token().cloned() else {
            break;
        };
        if !token.kind().is_trivia() {
            break;
        }
        let ends_line = token.kind() == SyntaxKind::Whitespace && token.text().contains('\n');
        out.push(token.clone());
        if ends_line {
            break;
        }
        next = token.next_sibling_or_token();
    }
    out
}

fn comment_content(text: &str) -> String {
    let text = text.strip_prefix("/*").unwrap_or(text);
    text.strip_suffix("*/").unwrap_or(text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sable_syntax::{parse_type_fragment, SyntaxNode};

    fn type_arguments(text: &str) -> Vec<ast::Type> {
        let green = parse_type_fragment(text).expect("type parses");
        let root = SyntaxNode::new_root(green);
        let generic = ast::GenericName::cast(root).expect("generic name");
        generic
            .type_argument_list()
            .expect("type arguments")
            .arguments()
            .collect()
    }

    #[test]
    fn single_block_comment_is_the_name() {
        let args = type_arguments("Func<string /*firstName*/, int /* count */, bool>");
        assert_eq!(name_from_annotation(&args[0]).as_deref(), Some("firstName"));
        // Content is kept verbatim.
        assert_eq!(name_from_annotation(&args[1]).as_deref(), Some(" count "));
        assert_eq!(name_from_annotation(&args[2]), None);
    }

    #[test]
    fn ambiguous_or_doc_comments_fall_back() {
        let args = type_arguments("Action<string /*a*/ /*b*/, int /** doc */>");
        assert_eq!(parameter_name(&args, 0, "arg1"), "arg1");
        assert_eq!(parameter_name(&args, 1, "arg2"), "arg2");
        assert_eq!(parameter_name(&args, 7, "obj"), "obj");
    }

    #[test]
    fn comment_on_the_next_line_is_not_trailing() {
        let args = type_arguments("Action<string\n    /*name*/>");
        assert_eq!(name_from_annotation(&args[0]), None);
    }
}
