//! Action-spec grammar: `<step>('|'<step>)*`.
//!
//! Each step is a kind character followed by its parameter:
//!   - `k<char>`  tap the key producing `<char>`
//!   - `m<button>`  click a mouse button, chosen by the parameter's first
//!     character: `l` left, `r` right (so `mleft` is a left click)
//!
//! Whitespace around a step, and between the kind and its parameter, is ignored,
//! so `"k a | m l"` parses the same as `"ka|ml"`.

use std::fmt;

use thiserror::Error;

pub const STEP_SEPARATOR: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// A single executable input step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    KeyTap(char),
    MouseClick(MouseButton),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::KeyTap(c) => write!(f, "key tap '{c}'"),
            Step::MouseClick(MouseButton::Left) => f.write_str("left click"),
            Step::MouseClick(MouseButton::Right) => f.write_str("right click"),
        }
    }
}

/// Why a single `|`-separated token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionTokenError {
    #[error("malformed action token {token:?}")]
    Malformed { token: String },
    #[error("unknown action kind '{kind}' in token {token:?}")]
    UnknownKind { kind: char, token: String },
    #[error("unknown mouse button {button:?} in token {token:?}")]
    UnknownMouseButton { button: String, token: String },
    /// Only single-character key identifiers are supported.
    #[error("unsupported key {key:?} in token {token:?}")]
    UnsupportedKey { key: String, token: String },
}

/// Result of parsing a whole action spec: the valid steps in order, plus every
/// token that had to be skipped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedAction {
    pub steps: Vec<Step>,
    pub errors: Vec<ActionTokenError>,
}

/// Parses one token (without the `|` separator) into a [`Step`].
pub fn parse_step(token: &str) -> Result<Step, ActionTokenError> {
    let trimmed = token.trim();
    let mut chars = trimmed.chars();
    let (kind, param) = match (chars.next(), chars.as_str().trim_start()) {
        (Some(kind), param) if !param.is_empty() => (kind, param),
        _ => {
            return Err(ActionTokenError::Malformed {
                token: trimmed.to_string(),
            })
        }
    };

    match kind {
        'k' => single_char(param).map(Step::KeyTap).ok_or_else(|| {
            ActionTokenError::UnsupportedKey {
                key: param.to_string(),
                token: trimmed.to_string(),
            }
        }),
        'm' => match param.chars().next() {
            Some('l') => Ok(Step::MouseClick(MouseButton::Left)),
            Some('r') => Ok(Step::MouseClick(MouseButton::Right)),
            _ => Err(ActionTokenError::UnknownMouseButton {
                button: param.to_string(),
                token: trimmed.to_string(),
            }),
        },
        other => Err(ActionTokenError::UnknownKind {
            kind: other,
            token: trimmed.to_string(),
        }),
    }
}

/// Splits `spec` on `|` and parses every token. Bad tokens are collected in
/// [`ParsedAction::errors`] and never abort the parse.
pub fn parse_action_spec(spec: &str) -> ParsedAction {
    let mut parsed = ParsedAction::default();
    for token in spec.split(STEP_SEPARATOR) {
        match parse_step(token) {
            Ok(step) => parsed.steps.push(step),
            Err(e) => parsed.errors.push(e),
        }
    }
    parsed
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_step ────────────────────────────────────────────────────────────

    #[test]
    fn key_tap_takes_parameter_char() {
        assert_eq!(parse_step("ka"), Ok(Step::KeyTap('a')));
        assert_eq!(parse_step("k a"), Ok(Step::KeyTap('a')));
        assert_eq!(parse_step("k1"), Ok(Step::KeyTap('1')));
    }

    #[test]
    fn mouse_buttons() {
        assert_eq!(parse_step("ml"), Ok(Step::MouseClick(MouseButton::Left)));
        assert_eq!(parse_step(" m r "), Ok(Step::MouseClick(MouseButton::Right)));
    }

    #[test]
    fn short_tokens_are_malformed() {
        for token in ["", " ", "k", " k ", "m", "x"] {
            assert!(
                matches!(parse_step(token), Err(ActionTokenError::Malformed { .. })),
                "{token:?} should be malformed"
            );
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert_eq!(
            parse_step("xa"),
            Err(ActionTokenError::UnknownKind {
                kind: 'x',
                token: "xa".to_string()
            })
        );
    }

    #[test]
    fn unknown_mouse_button_is_rejected() {
        assert!(matches!(
            parse_step("mx"),
            Err(ActionTokenError::UnknownMouseButton { .. })
        ));
        assert!(matches!(
            parse_step("mxl"),
            Err(ActionTokenError::UnknownMouseButton { .. })
        ));
    }

    #[test]
    fn mouse_button_is_decided_by_first_parameter_char() {
        assert_eq!(parse_step("mleft"), Ok(Step::MouseClick(MouseButton::Left)));
        assert_eq!(parse_step("mrr"), Ok(Step::MouseClick(MouseButton::Right)));
        assert_eq!(parse_step("m right"), Ok(Step::MouseClick(MouseButton::Right)));
    }

    #[test]
    fn multi_char_key_names_are_unsupported() {
        assert!(matches!(
            parse_step("kspace"),
            Err(ActionTokenError::UnsupportedKey { .. })
        ));
    }

    // ── parse_action_spec ─────────────────────────────────────────────────────

    #[test]
    fn steps_keep_their_order() {
        let parsed = parse_action_spec("k a|m l|kb|mr");
        assert_eq!(
            parsed.steps,
            vec![
                Step::KeyTap('a'),
                Step::MouseClick(MouseButton::Left),
                Step::KeyTap('b'),
                Step::MouseClick(MouseButton::Right),
            ]
        );
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn bad_tokens_are_skipped_and_reported() {
        let parsed = parse_action_spec("ka||zz|k|mq|ml");
        assert_eq!(
            parsed.steps,
            vec![Step::KeyTap('a'), Step::MouseClick(MouseButton::Left)]
        );
        assert_eq!(parsed.errors.len(), 4);
    }

    #[test]
    fn lone_short_token_yields_no_steps() {
        let parsed = parse_action_spec("k");
        assert!(parsed.steps.is_empty());
        assert_eq!(parsed.errors.len(), 1);
    }

    #[test]
    fn step_display() {
        assert_eq!(Step::KeyTap('q').to_string(), "key tap 'q'");
        assert_eq!(Step::MouseClick(MouseButton::Right).to_string(), "right click");
    }
}
