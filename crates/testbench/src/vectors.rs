//! Parsing for the line-oriented stimulus vector format.
//!
//! A vector file drives the arbiter one `tick` directive at a time and
//! checks the registered outputs with `expect` directives:
//!
//! ```text
//! # two contenders for resource 3
//! tick reset=1
//! tick req=4,4,0,0,0,0,0,0
//! tick req=4,4,0,0,0,0,0,0 ack=0,0,0,1,0,0,0,0
//! expect grant[0] == 4
//! expect valid[0] == 1
//! expect valid[1] == 0
//! ```
//!
//! ## Supported Syntax
//!
//! - Tick directives: `tick [reset=0|1] [req=v,v,v,v,v,v,v,v] [ack=b,b,b,b,b,b,b,b]`
//! - Expectations: `expect grant[i] == v`, `expect valid[i] != 0`
//! - Comments: `#` or `;` to end of line
//! - Literals: decimal, `0x` hex, `0b` binary
//!
//! Omitted tick fields default to all zeroes. An `expect` line attaches to
//! the most recent `tick` and is evaluated after that tick commits. Request
//! lanes accept any byte so that out-of-range stimulus can exercise the
//! decode policies; expectation values are range-checked at parse time
//! because the outputs they read never leave `[0, 8]`.

use std::fmt;

use arbiter_core::{TickInputs, MAX_REQUEST_VALUE, PORT_COUNT, RESOURCE_COUNT};

/// Registered output field read by an expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectField {
    /// The raw grant value lane `grant[i]`.
    Grant,
    /// The grant strobe lane `valid[i]`.
    Valid,
}

impl fmt::Display for ExpectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grant => write!(f, "grant"),
            Self::Valid => write!(f, "valid"),
        }
    }
}

/// Comparison operator in an `expect` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Assert equality (`==`).
    Equal,
    /// Assert inequality (`!=`).
    NotEqual,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "=="),
            Self::NotEqual => write!(f, "!="),
        }
    }
}

/// A single parsed `expect` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    /// Output field under test.
    pub field: ExpectField,
    /// Input port index in `[0, 7]`.
    pub port: usize,
    /// Comparison operator.
    pub op: CompareOp,
    /// Expected raw value.
    pub value: u8,
    /// 1-indexed source line of the directive.
    pub line: usize,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {} {}",
            self.field, self.port, self.op, self.value
        )
    }
}

/// One `tick` directive together with its attached expectations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorTick {
    /// Stimulus applied on this tick.
    pub inputs: TickInputs,
    /// Expectations evaluated after this tick commits.
    pub expectations: Vec<Expectation>,
    /// 1-indexed source line of the `tick` directive.
    pub line: usize,
}

/// A fully parsed vector file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VectorFile {
    /// Ticks in file order.
    pub ticks: Vec<VectorTick>,
}

/// Parse failure with the source line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorError {
    /// 1-indexed line number of the offending directive.
    pub line: usize,
    /// Description of the error.
    pub message: String,
}

impl fmt::Display for VectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for VectorError {}

/// Parses a complete vector file from source text.
///
/// Each non-empty, non-comment line must be a `tick` or `expect`
/// directive. Parsing stops at the first malformed line.
///
/// # Errors
///
/// Returns [`VectorError`] with the 1-indexed line number if any line has
/// invalid syntax or an `expect` appears before the first `tick`.
pub fn parse_vectors(source: &str) -> Result<VectorFile, VectorError> {
    let mut ticks: Vec<VectorTick> = Vec::new();

    for (idx, raw_line) in source.lines().enumerate() {
        let line = idx + 1;
        let text = strip_comment(raw_line).trim();

        if text.is_empty() {
            continue;
        }

        let (keyword, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));

        match keyword {
            "tick" => {
                let inputs = parse_tick(rest).map_err(|message| VectorError { line, message })?;
                ticks.push(VectorTick {
                    inputs,
                    expectations: Vec::new(),
                    line,
                });
            }
            "expect" => {
                let expectation =
                    parse_expect(rest, line).map_err(|message| VectorError { line, message })?;
                let Some(tick) = ticks.last_mut() else {
                    return Err(VectorError {
                        line,
                        message: "expect before any tick".to_string(),
                    });
                };
                tick.expectations.push(expectation);
            }
            other => {
                return Err(VectorError {
                    line,
                    message: format!("unknown directive `{other}`"),
                });
            }
        }
    }

    Ok(VectorFile { ticks })
}

/// Strips a comment (everything from `#` or `;` to end of line).
fn strip_comment(line: &str) -> &str {
    let end = line.find(['#', ';']).unwrap_or(line.len());
    &line[..end]
}

/// Parses the fields of a `tick` directive. Fields may appear in any
/// order; each may appear at most once.
fn parse_tick(text: &str) -> Result<TickInputs, String> {
    let mut inputs = TickInputs::idle();
    let mut seen_reset = false;
    let mut seen_req = false;
    let mut seen_ack = false;

    for field in text.split_whitespace() {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, found `{field}`"))?;

        match key {
            "reset" => {
                if seen_reset {
                    return Err("duplicate reset field".to_string());
                }
                seen_reset = true;
                inputs.reset = parse_bit(value)?;
            }
            "req" => {
                if seen_req {
                    return Err("duplicate req field".to_string());
                }
                seen_req = true;
                inputs.request = parse_request_lanes(value)?;
            }
            "ack" => {
                if seen_ack {
                    return Err("duplicate ack field".to_string());
                }
                seen_ack = true;
                inputs.ack = parse_ack_lanes(value)?;
            }
            other => return Err(format!("unknown tick field `{other}`")),
        }
    }

    Ok(inputs)
}

/// Parses an expectation like `grant[0] == 4` or `valid[3] != 0`.
fn parse_expect(text: &str, line: usize) -> Result<Expectation, String> {
    let open = text
        .find('[')
        .ok_or_else(|| "expected `grant[i]` or `valid[i]`".to_string())?;
    let close = text
        .find(']')
        .ok_or_else(|| "expected `]` after port index".to_string())?;
    if close < open {
        return Err("expected `[` before `]`".to_string());
    }

    let field = match text[..open].trim() {
        "grant" => ExpectField::Grant,
        "valid" => ExpectField::Valid,
        other => return Err(format!("unknown output field `{other}`")),
    };
    let port = parse_port(text[open + 1..close].trim())?;
    let (op, value_text) = parse_compare_op(text[close + 1..].trim_start())?;
    let value = parse_value(value_text.trim())?;

    match field {
        ExpectField::Grant if value > MAX_REQUEST_VALUE => {
            return Err(format!(
                "grant value {value} is outside [0, {MAX_REQUEST_VALUE}]"
            ));
        }
        ExpectField::Valid if value > 1 => {
            return Err(format!("valid is a single bit, found {value}"));
        }
        _ => {}
    }

    Ok(Expectation {
        field,
        port,
        op,
        value,
        line,
    })
}

/// Parses a port index in `[0, 7]`.
fn parse_port(text: &str) -> Result<usize, String> {
    let port = text
        .parse::<usize>()
        .map_err(|_| format!("invalid port index `{text}`"))?;
    if port >= PORT_COUNT {
        return Err(format!(
            "port index {port} is outside [0, {}]",
            PORT_COUNT - 1
        ));
    }
    Ok(port)
}

/// Parses a comparison operator (`==` or `!=`), returning the remainder.
fn parse_compare_op(text: &str) -> Result<(CompareOp, &str), String> {
    text.strip_prefix("==")
        .map(|rest| (CompareOp::Equal, rest))
        .or_else(|| text.strip_prefix("!=").map(|rest| (CompareOp::NotEqual, rest)))
        .ok_or_else(|| "expected `==` or `!=`".to_string())
}

/// Parses exactly eight comma-separated request values.
fn parse_request_lanes(text: &str) -> Result<[u8; PORT_COUNT], String> {
    let entries: Vec<&str> = text.split(',').collect();
    if entries.len() != PORT_COUNT {
        return Err(format!(
            "expected {PORT_COUNT} comma-separated request lanes, found {}",
            entries.len()
        ));
    }

    let mut lanes = [0_u8; PORT_COUNT];
    for (lane, entry) in lanes.iter_mut().zip(&entries) {
        *lane = parse_value(entry.trim())?;
    }
    Ok(lanes)
}

/// Parses exactly eight comma-separated ack bits.
fn parse_ack_lanes(text: &str) -> Result<[bool; RESOURCE_COUNT], String> {
    let entries: Vec<&str> = text.split(',').collect();
    if entries.len() != RESOURCE_COUNT {
        return Err(format!(
            "expected {RESOURCE_COUNT} comma-separated ack bits, found {}",
            entries.len()
        ));
    }

    let mut lanes = [false; RESOURCE_COUNT];
    for (lane, entry) in lanes.iter_mut().zip(&entries) {
        *lane = parse_bit(entry.trim())?;
    }
    Ok(lanes)
}

/// Parses a single bit written as `0` or `1`.
fn parse_bit(text: &str) -> Result<bool, String> {
    match text {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(format!("expected 0 or 1, found `{other}`")),
    }
}

/// Parses an unsigned 8-bit value (decimal, hex, or binary).
fn parse_value(text: &str) -> Result<u8, String> {
    if text.is_empty() {
        return Err("expected a value".to_string());
    }

    match text.as_bytes() {
        [b'0', b'x' | b'X', ..] => {
            u8::from_str_radix(&text[2..], 16).map_err(|_| format!("invalid hex value `{text}`"))
        }
        [b'0', b'b' | b'B', ..] => {
            u8::from_str_radix(&text[2..], 2).map_err(|_| format!("invalid binary value `{text}`"))
        }
        _ => text
            .parse::<u8>()
            .map_err(|_| format!("invalid decimal value `{text}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tick_with_requests_and_acks() {
        let file = parse_vectors("tick req=0,4,0,0,0,0,0,0 ack=0,0,0,1,0,0,0,0").unwrap();

        assert_eq!(file.ticks.len(), 1);
        let tick = &file.ticks[0];
        assert_eq!(tick.line, 1);
        assert!(!tick.inputs.reset);
        assert_eq!(tick.inputs.request, [0, 4, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            tick.inputs.ack,
            [false, false, false, true, false, false, false, false]
        );
    }

    #[test]
    fn parse_tick_reset_only() {
        let file = parse_vectors("tick reset=1").unwrap();

        assert!(file.ticks[0].inputs.reset);
        assert_eq!(file.ticks[0].inputs.request, [0; 8]);
    }

    #[test]
    fn parse_bare_tick_is_idle() {
        let file = parse_vectors("tick").unwrap();

        assert_eq!(file.ticks[0].inputs, TickInputs::idle());
    }

    #[test]
    fn parse_tick_fields_in_any_order() {
        let forward = parse_vectors("tick req=1,0,0,0,0,0,0,0 ack=1,0,0,0,0,0,0,0").unwrap();
        let reversed = parse_vectors("tick ack=1,0,0,0,0,0,0,0 req=1,0,0,0,0,0,0,0").unwrap();

        assert_eq!(forward.ticks[0].inputs, reversed.ticks[0].inputs);
    }

    #[test]
    fn parse_values_in_hex_and_binary() {
        let file = parse_vectors("tick req=0x4,0b101,8,0,0,0,0,0").unwrap();

        assert_eq!(file.ticks[0].inputs.request, [4, 5, 8, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn parse_out_of_range_request_lane() {
        // Kept at parse time so vector files can drive the fault policies.
        let file = parse_vectors("tick req=255,0,0,0,0,0,0,0").unwrap();

        assert_eq!(file.ticks[0].inputs.request[0], 255);
    }

    #[test]
    fn parse_expect_grant_equality() {
        let file = parse_vectors("tick\nexpect grant[0] == 4").unwrap();

        assert_eq!(
            file.ticks[0].expectations,
            vec![Expectation {
                field: ExpectField::Grant,
                port: 0,
                op: CompareOp::Equal,
                value: 4,
                line: 2,
            }]
        );
    }

    #[test]
    fn parse_expect_valid_inequality() {
        let file = parse_vectors("tick\nexpect valid[7] != 0").unwrap();

        assert_eq!(
            file.ticks[0].expectations,
            vec![Expectation {
                field: ExpectField::Valid,
                port: 7,
                op: CompareOp::NotEqual,
                value: 0,
                line: 2,
            }]
        );
    }

    #[test]
    fn expect_attaches_to_most_recent_tick() {
        let source = "tick req=4,0,0,0,0,0,0,0\ntick\nexpect grant[0] == 4";
        let file = parse_vectors(source).unwrap();

        assert!(file.ticks[0].expectations.is_empty());
        assert_eq!(file.ticks[1].expectations.len(), 1);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let source = "# header comment\n\n  ; another style\ntick reset=1 # trailing\n";
        let file = parse_vectors(source).unwrap();

        assert_eq!(file.ticks.len(), 1);
        assert!(file.ticks[0].inputs.reset);
        assert_eq!(file.ticks[0].line, 4);
    }

    #[test]
    fn expect_before_any_tick_is_rejected() {
        let error = parse_vectors("# comment\nexpect grant[0] == 0").unwrap_err();

        assert_eq!(error.line, 2);
        assert!(error.message.contains("before any tick"));
    }

    #[test]
    fn unknown_directive_is_rejected() {
        let error = parse_vectors("tick\nstep req=0,0,0,0,0,0,0,0").unwrap_err();

        assert_eq!(error.line, 2);
        assert!(error.message.contains("unknown directive"));
    }

    #[test]
    fn wrong_lane_count_is_rejected() {
        let error = parse_vectors("tick req=1,2,3").unwrap_err();

        assert!(error.message.contains("8 comma-separated"));
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let error = parse_vectors("tick reset=1 reset=0").unwrap_err();

        assert!(error.message.contains("duplicate reset"));
    }

    #[test]
    fn port_index_out_of_range_is_rejected() {
        let error = parse_vectors("tick\nexpect grant[8] == 0").unwrap_err();

        assert_eq!(error.line, 2);
        assert!(error.message.contains("port index 8"));
    }

    #[test]
    fn grant_value_out_of_range_is_rejected() {
        let error = parse_vectors("tick\nexpect grant[0] == 9").unwrap_err();

        assert!(error.message.contains("outside [0, 8]"));
    }

    #[test]
    fn valid_value_above_one_is_rejected() {
        let error = parse_vectors("tick\nexpect valid[0] == 2").unwrap_err();

        assert!(error.message.contains("single bit"));
    }

    #[test]
    fn ack_lane_must_be_a_bit() {
        let error = parse_vectors("tick ack=0,0,2,0,0,0,0,0").unwrap_err();

        assert!(error.message.contains("expected 0 or 1"));
    }

    #[test]
    fn malformed_field_is_rejected() {
        let error = parse_vectors("tick reset").unwrap_err();

        assert!(error.message.contains("key=value"));
    }

    #[test]
    fn error_reports_one_based_line() {
        let source = "tick\ntick\n; comment\ntick req=oops,0,0,0,0,0,0,0";
        let error = parse_vectors(source).unwrap_err();

        assert_eq!(error.line, 4);
        assert!(error.message.contains("invalid decimal value `oops`"));
        assert_eq!(error.to_string(), format!("line 4: {}", error.message));
    }
}
