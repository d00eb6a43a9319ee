//! IORegistry text parsing (`ioreg -l` output) and the accelerator registry.
//!
//! ioreg prints each object as a `+-o Name <class ...>` header followed by
//! `"Key" = value` lines. Values are quoted strings, integers, `Yes`/`No`,
//! `<hex data>`, `(arrays)` and `{"nested"=dictionaries}`. Unsigned 64-bit
//! integers above `i64::MAX` are how ioreg prints negative numbers, so they
//! are wrapped back into `i64`.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::command::CommandRunner;

/// Path to the ioreg binary on macOS.
pub const IOREG_PATH: &str = "/usr/sbin/ioreg";

pub type IoDict = BTreeMap<String, IoValue>;

/// One IORegistry property value.
#[derive(Debug, Clone, PartialEq)]
pub enum IoValue {
    Bool(bool),
    Int(i64),
    Str(String),
    /// Hex payload between `<` and `>`, kept as text.
    Data(String),
    Array(Vec<IoValue>),
    Dict(IoDict),
}

impl IoValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_i64().map(|v| v as f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&IoDict> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume up to (not including) the next byte matching `stop`.
    fn take_until(&mut self, stop: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if !stop(b)) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    fn quoted(&mut self) -> Option<String> {
        if !self.eat(b'"') {
            return None;
        }
        let s = self.take_until(|b| b == b'"').to_string();
        self.eat(b'"').then_some(s)
    }

    fn value(&mut self) -> Option<IoValue> {
        self.skip_ws();
        match self.peek()? {
            b'"' => self.quoted().map(IoValue::Str),
            b'{' => self.dict().map(IoValue::Dict),
            b'(' => self.array().map(IoValue::Array),
            b'<' => {
                self.pos += 1;
                let data = self.take_until(|b| b == b'>').to_string();
                self.eat(b'>').then_some(IoValue::Data(data))
            }
            _ => {
                let word = self
                    .take_until(|b| matches!(b, b',' | b'}' | b')'))
                    .trim_end();
                (!word.is_empty()).then(|| scalar(word))
            }
        }
    }

    fn dict(&mut self) -> Option<IoDict> {
        self.eat(b'{');
        let mut dict = IoDict::new();
        loop {
            self.skip_ws();
            if self.eat(b'}') {
                return Some(dict);
            }
            let key = self.quoted()?;
            self.skip_ws();
            if !self.eat(b'=') {
                return None;
            }
            let value = self.value()?;
            dict.insert(key, value);
            self.skip_ws();
            self.eat(b',');
        }
    }

    fn array(&mut self) -> Option<Vec<IoValue>> {
        self.eat(b'(');
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(b')') {
                return Some(items);
            }
            items.push(self.value()?);
            self.skip_ws();
            self.eat(b',');
        }
    }
}

fn scalar(word: &str) -> IoValue {
    match word {
        "Yes" => IoValue::Bool(true),
        "No" => IoValue::Bool(false),
        _ => {
            if let Ok(v) = word.parse::<i64>() {
                IoValue::Int(v)
            } else if let Ok(v) = word.parse::<u64>() {
                IoValue::Int(v as i64)
            } else {
                IoValue::Str(word.to_string())
            }
        }
    }
}

/// Parse a standalone value such as `{"Watts"=96}` or `Yes`.
pub fn parse_value(text: &str) -> Option<IoValue> {
    Cursor::new(text.trim()).value()
}

/// Parse one `"Key" = value` property line, tolerating the `| |` tree prefix.
pub fn parse_property_line(line: &str) -> Option<(String, IoValue)> {
    let body = line.trim_start_matches(|c: char| c == '|' || c.is_whitespace());
    let mut cursor = Cursor::new(body);
    let key = cursor.quoted()?;
    cursor.skip_ws();
    if !cursor.eat(b'=') {
        return None;
    }
    let value = cursor.value()?;
    Some((key, value))
}

/// Split ioreg output into one property dictionary per `+-o` object.
pub fn parse_blocks(output: &str) -> Vec<IoDict> {
    let mut blocks: Vec<IoDict> = Vec::new();
    for line in output.lines() {
        let body = line.trim_start_matches(|c: char| c == '|' || c.is_whitespace());
        if body.starts_with("+-o") {
            blocks.push(IoDict::new());
            continue;
        }
        if let Some((key, value)) = parse_property_line(line) {
            if blocks.is_empty() {
                blocks.push(IoDict::new());
            }
            if let Some(block) = blocks.last_mut() {
                block.insert(key, value);
            }
        }
    }
    blocks
}

/// Properties of every object of `class`, at depth 1 only.
pub fn class_properties(commands: &dyn CommandRunner, class: &str) -> Option<Vec<IoDict>> {
    let output = commands
        .run(IOREG_PATH, &["-r", "-d", "1", "-c", class, "-l", "-w0"])
        .map_err(|e| log::warn!("ioreg {class}: {e}"))
        .ok()?;
    Some(parse_blocks(&output))
}

// ---------------------------------------------------------------------------
// Accelerators
// ---------------------------------------------------------------------------

/// Enumerates GPU accelerator objects and their properties.
pub trait AcceleratorRegistry: Send + Sync {
    /// `None` when the registry cannot be queried or has no accelerators.
    fn accelerators(&self) -> Option<Vec<IoDict>>;
}

/// [`AcceleratorRegistry`] backed by `ioreg -c IOAccelerator`.
pub struct IoregAccelerators {
    commands: Arc<dyn CommandRunner>,
}

impl IoregAccelerators {
    pub fn new(commands: Arc<dyn CommandRunner>) -> Self {
        Self { commands }
    }
}

impl AcceleratorRegistry for IoregAccelerators {
    fn accelerators(&self) -> Option<Vec<IoDict>> {
        let blocks = class_properties(self.commands.as_ref(), "IOAccelerator")?;
        let blocks: Vec<IoDict> = blocks.into_iter().filter(|b| !b.is_empty()).collect();
        (!blocks.is_empty()).then_some(blocks)
    }
}

/// Registry with no accelerators.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAccelerators;

impl AcceleratorRegistry for NoAccelerators {
    fn accelerators(&self) -> Option<Vec<IoDict>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeCommands;

    const ACCELERATOR: &str = r#"+-o AGXAcceleratorG13X  <class AGXAcceleratorG13X, id 0x1000004f2, registered, matched, active, busy 0 (0 ms), retain 82>
    {
      "IOClass" = "AGXAcceleratorG13X"
      "PerformanceStatistics" = {"In use system memory"=123863040,"Device Utilization %"=17,"Tiler Utilization %"=9,"Alloc system memory"=1384120320}
      "IOMatchCategory" = "IOAccelerator"
      "AGXParameterBufferMaxSizeEverMemless" = 125829120
      "GPUConfigurationVariable" = {"gpu_gen"=13,"num_cores"=8,"core_mask_list"=(255)}
      "IOReportLegend" = ({"IOReportChannels"=((5764607523034234880,4294967296,"GPU Stats")),"IOReportGroupName"="GPU Stats"})
      "SurfaceList" = <00010203>
      "CFBundleIdentifier" = "com.apple.AGXG13X"
      "IOGeneralInterest" = IOCommand is not serializable
    }
"#;

    #[test]
    fn parses_nested_dictionary() {
        let (key, value) = parse_property_line(
            r#"    |   "PerformanceStatistics" = {"Device Utilization %"=17,"Nested"={"a"=Yes}}"#,
        )
        .unwrap();
        assert_eq!(key, "PerformanceStatistics");
        let stats = value.as_dict().unwrap();
        assert_eq!(stats["Device Utilization %"].as_i64(), Some(17));
        let nested = stats["Nested"].as_dict().unwrap();
        assert_eq!(nested["a"].as_bool(), Some(true));
    }

    #[test]
    fn wraps_unsigned_negative_numbers() {
        let (_, value) = parse_property_line(r#""InstantAmperage" = 18446744073709550938"#).unwrap();
        assert_eq!(value.as_i64(), Some(-678));
    }

    #[test]
    fn parses_scalars() {
        assert_eq!(parse_value("Yes"), Some(IoValue::Bool(true)));
        assert_eq!(parse_value("No"), Some(IoValue::Bool(false)));
        assert_eq!(parse_value("-12"), Some(IoValue::Int(-12)));
        assert_eq!(parse_value(r#""text""#), Some(IoValue::Str("text".into())));
        assert_eq!(parse_value("<beef>"), Some(IoValue::Data("beef".into())));
        assert_eq!(
            parse_value("(1,2,(3))"),
            Some(IoValue::Array(vec![
                IoValue::Int(1),
                IoValue::Int(2),
                IoValue::Array(vec![IoValue::Int(3)]),
            ]))
        );
    }

    #[test]
    fn rejects_non_property_lines() {
        assert!(parse_property_line("    {").is_none());
        assert!(parse_property_line("+-o Root  <class IORegistryEntry>").is_none());
        assert!(parse_property_line(r#""Broken" = {"a"=1"#).is_none());
    }

    #[test]
    fn splits_blocks_per_object() {
        let text = format!("{ACCELERATOR}{}", ACCELERATOR.replace("17", "40"));
        let blocks = parse_blocks(&text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["IOClass"].as_str(), Some("AGXAcceleratorG13X"));
        assert_eq!(
            blocks[0]["GPUConfigurationVariable"].as_dict().unwrap()["num_cores"].as_i64(),
            Some(8)
        );
        let util = |b: &IoDict| {
            b["PerformanceStatistics"].as_dict().unwrap()["Device Utilization %"].as_i64()
        };
        assert_eq!(util(&blocks[0]), Some(17));
        assert_eq!(util(&blocks[1]), Some(40));
        assert_eq!(
            blocks[0]["IOGeneralInterest"].as_str(),
            Some("IOCommand is not serializable")
        );
    }

    #[test]
    fn accelerators_from_command_output() {
        let commands = Arc::new(FakeCommands::new().with_output(IOREG_PATH, ACCELERATOR));
        let registry = IoregAccelerators::new(commands);
        let list = registry.accelerators().unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn failed_or_empty_query_is_none() {
        let failing = IoregAccelerators::new(Arc::new(FakeCommands::new()));
        assert!(failing.accelerators().is_none());

        let empty = IoregAccelerators::new(Arc::new(FakeCommands::new().with_output(IOREG_PATH, "")));
        assert!(empty.accelerators().is_none());
    }

    #[test]
    #[ignore] // Requires macOS ioreg
    fn live_accelerators() {
        let registry = IoregAccelerators::new(Arc::new(crate::platform::SystemCommand));
        assert!(registry.accelerators().is_some());
    }
}
