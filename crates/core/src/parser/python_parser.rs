use crate::{
    error::{Error, Result},
    parser::utils::{find_first_error, position_label},
};
use std::path::Path;
use tree_sitter::{Parser, Tree};

pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| Error::TreeSitterError(format!("Failed to set language: {e}")))?;
        Ok(Self { parser })
    }

    /// Parse source text, accepting trees that contain error nodes.
    pub fn parse(&mut self, source: &str) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| Error::TreeSitterError("Failed to parse source code".to_string()))
    }

    /// Parse source text and reject it if tree-sitter had to recover from
    /// a syntax error anywhere in the file.
    pub fn parse_strict(&mut self, source: &str, path: &Path) -> Result<Tree> {
        let tree = self.parse(source)?;
        let root = tree.root_node();
        if root.has_error() {
            let reason = match find_first_error(root) {
                Some(node) if node.is_missing() => {
                    format!("missing `{}` at {}", node.kind(), position_label(&node))
                }
                Some(node) => format!("syntax error at {}", position_label(&node)),
                None => "syntax error".to_string(),
            };
            return Err(Error::ParseError {
                path: path.to_path_buf(),
                reason,
            });
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_creation() {
        let parser = PythonParser::new();
        assert!(parser.is_ok());
    }

    #[test]
    fn test_parse_empty_source() {
        let mut parser = PythonParser::new().unwrap();
        let tree = parser.parse("").unwrap();
        assert_eq!(tree.root_node().kind(), "module");
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_parse_strict_accepts_valid_source() {
        let mut parser = PythonParser::new().unwrap();
        let source = "import os\n\ndef main():\n    return os.getcwd()\n";
        assert!(parser.parse_strict(source, Path::new("ok.py")).is_ok());
    }

    #[test]
    fn test_parse_strict_rejects_syntax_error() {
        let mut parser = PythonParser::new().unwrap();
        let source = "import foo\ndef broken(:\n    pass\n";
        let err = parser
            .parse_strict(source, Path::new("broken.py"))
            .unwrap_err();
        match err {
            Error::ParseError { path, reason } => {
                assert_eq!(path, Path::new("broken.py"));
                assert!(reason.contains("line 2"), "unexpected reason: {reason}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_lenient_parse_keeps_error_nodes() {
        let mut parser = PythonParser::new().unwrap();
        let tree = parser.parse("def broken(:\n    pass\n").unwrap();
        assert!(tree.root_node().has_error());
    }
}
