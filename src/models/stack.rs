//! Stack-trace line parsing
//!
//! Recognizes two line shapes: an error header (`Kind: message`) and a call
//! frame (`at [function (]file[:line[:col]][)]`). Anything else passes
//! through verbatim.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FRAME_EXP: Regex = Regex::new(r"^\s*at (?:(.+) \()?(.*?)((?::\d+)*)\)?$").unwrap();
    static ref HEADER_EXP: Regex = Regex::new(r"^(.*?): (.*)$").unwrap();
}

/// One parsed line of a stack trace
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackFrame {
    /// The raw line, kept for verbatim rendering
    pub line: String,
    pub kind: FrameKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// `Kind: message` header line
    Header { error: String, message: String },
    /// `at [function (]file[:line[:col]][)]` call frame
    Call {
        function: Option<String>,
        file: String,
        location: String,
    },
    Verbatim,
}

impl StackFrame {
    /// File path referenced by a call frame, if any
    pub fn file(&self) -> Option<&str> {
        match &self.kind {
            FrameKind::Call { file, .. } => Some(file),
            _ => None,
        }
    }

    /// Human-readable text: the message for headers, the raw line otherwise
    pub fn display_text(&self) -> &str {
        match &self.kind {
            FrameKind::Header { message, .. } => message,
            _ => &self.line,
        }
    }
}

/// Parse raw stack text into frames, one per line
pub fn parse_stack(stack: &str) -> Vec<StackFrame> {
    stack
        .lines()
        .map(|line| {
            // call frames take precedence over the looser header shape
            if let Some(captures) = FRAME_EXP.captures(line) {
                return StackFrame {
                    line: line.to_string(),
                    kind: FrameKind::Call {
                        function: captures.get(1).map(|m| m.as_str().to_string()),
                        file: captures.get(2).map_or(String::new(), |m| m.as_str().to_string()),
                        location: captures.get(3).map_or(String::new(), |m| m.as_str().to_string()),
                    },
                };
            }
            if let Some(captures) = HEADER_EXP.captures(line) {
                return StackFrame {
                    line: line.to_string(),
                    kind: FrameKind::Header {
                        error: captures[1].to_string(),
                        message: captures[2].to_string(),
                    },
                };
            }
            StackFrame {
                line: line.to_string(),
                kind: FrameKind::Verbatim,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_line() {
        let frames = parse_stack("CheckError: left != right");
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].kind,
            FrameKind::Header {
                error: "CheckError".to_string(),
                message: "left != right".to_string(),
            }
        );
        assert_eq!(frames[0].display_text(), "left != right");
    }

    #[test]
    fn parses_call_frame_with_function() {
        let frames = parse_stack("    at check (test/math.rs:12:9)");
        assert_eq!(
            frames[0].kind,
            FrameKind::Call {
                function: Some("check".to_string()),
                file: "test/math.rs".to_string(),
                location: ":12:9".to_string(),
            }
        );
        assert_eq!(frames[0].file(), Some("test/math.rs"));
        assert_eq!(frames[0].display_text(), "    at check (test/math.rs:12:9)");
    }

    #[test]
    fn parses_bare_call_frame() {
        let frames = parse_stack("at test/math.rs:12");
        assert_eq!(
            frames[0].kind,
            FrameKind::Call {
                function: None,
                file: "test/math.rs".to_string(),
                location: ":12".to_string(),
            }
        );
    }

    #[test]
    fn passes_unrecognized_lines_through() {
        let frames = parse_stack("something went sideways");
        assert_eq!(frames[0].kind, FrameKind::Verbatim);
        assert_eq!(frames[0].display_text(), "something went sideways");
    }

    #[test]
    fn parses_multi_line_stack() {
        let stack = "CheckError: expected 4\n    at check (test/math.rs:3:5)\n    at harness/core.rs:80:1";
        let frames = parse_stack(stack);
        assert_eq!(frames.len(), 3);
        assert!(matches!(frames[0].kind, FrameKind::Header { .. }));
        assert_eq!(frames[1].file(), Some("test/math.rs"));
        assert_eq!(frames[2].file(), Some("harness/core.rs"));
    }
}
