// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compact text format for a whole graph.
//!
//! A graph is a `#`-separated list of node records. An ordinary record is
//!
//! ```text
//! kind|id|cellX cellY|inputId inputId ...|field|field|...
//! ```
//!
//! where positions are stored in 16-unit grid cells and fields follow the
//! node kind's declaration order. Kinds with a custom encoding write
//! `kind|id|payload` instead and skip the field walk. Default nodes are only
//! written while a link references them.

use crate::error::SerializeError;
use crate::graph::Graph;
use crate::link::NodeId;
use crate::node::Node;
use crate::value::Color;
use glam::{Vec2, Vec3, Vec4};
use indexmap::IndexMap;
use ordoplay_curves::{AlphaKey, AnimationCurve, ColorKey, ColorRamp, CurveKey, RampMode, WrapMode};
use tracing::debug;

const RECORD_SEPARATOR: char = '#';
const FIELD_SEPARATOR: char = '|';
const GRID: f32 = 16.0;

const COLOR_DECIMALS: usize = 3;
const KEY_TIME_DECIMALS: usize = 3;
const CURVE_DECIMALS: usize = 2;

/// Opaque payload encoding for node kinds that bypass the field walk
pub trait CustomSerialize {
    /// Payload written after `kind|id|`
    fn encode(&self) -> String;

    /// Restore from the `|`-separated payload parts
    fn decode(&mut self, node: i32, parts: &[&str]) -> Result<(), SerializeError>;
}

/// Enumeration stored as its integer discriminant
pub trait FieldEnum: Sized + Copy {
    /// Name used in error messages
    const NAME: &'static str;

    /// Look up a variant by discriminant
    fn from_index(index: i32) -> Option<Self>;

    /// Stable discriminant
    fn index(self) -> i32;
}

impl FieldEnum for WrapMode {
    const NAME: &'static str = "wrap mode";

    fn from_index(index: i32) -> Option<Self> {
        WrapMode::from_index(index)
    }

    fn index(self) -> i32 {
        WrapMode::index(self)
    }
}

impl FieldEnum for RampMode {
    const NAME: &'static str = "ramp mode";

    fn from_index(index: i32) -> Option<Self> {
        RampMode::from_index(index)
    }

    fn index(self) -> i32 {
        RampMode::index(self)
    }
}

/// Format with at most `decimals` decimals, trimming trailing zeros
pub fn format_trimmed(value: f32, decimals: usize) -> String {
    let mut text = format!("{value:.decimals$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

fn invalid(node: i32, expected: &'static str, text: &str) -> SerializeError {
    SerializeError::InvalidLiteral {
        node,
        expected,
        text: text.to_string(),
    }
}

/// Parse a float literal
pub fn parse_f32(node: i32, text: &str) -> Result<f32, SerializeError> {
    text.trim().parse().map_err(|_| invalid(node, "float", text))
}

/// Parse an integer literal
pub fn parse_i32(node: i32, text: &str) -> Result<i32, SerializeError> {
    text.trim().parse().map_err(|_| invalid(node, "int", text))
}

/// Parse a `t`/`f` literal
pub fn parse_bool(node: i32, text: &str) -> Result<bool, SerializeError> {
    match text {
        "t" => Ok(true),
        "f" => Ok(false),
        _ => Err(invalid(node, "bool", text)),
    }
}

/// Encode a bool as `t`/`f`
pub fn format_bool(value: bool) -> &'static str {
    if value { "t" } else { "f" }
}

fn parse_components<const N: usize>(node: i32, text: &str, expected: &'static str) -> Result<[f32; N], SerializeError> {
    let mut out = [0.0; N];
    let mut parts = text.split(',');
    for slot in &mut out {
        let part = parts.next().ok_or_else(|| invalid(node, expected, text))?;
        *slot = parse_f32(node, part)?;
    }
    if parts.next().is_some() {
        return Err(invalid(node, expected, text));
    }
    Ok(out)
}

fn join(values: &[f32], format: impl Fn(f32) -> String) -> String {
    values.iter().map(|&v| format(v)).collect::<Vec<_>>().join(",")
}

/// Ordered field sink for one node record
#[derive(Debug, Default)]
pub struct FieldWriter {
    fields: Vec<String>,
}

impl FieldWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields written so far
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    fn push(&mut self, field: String) {
        self.fields.push(field);
    }

    /// Integer field
    pub fn int(&mut self, value: i32) {
        self.push(value.to_string());
    }

    /// Float field, shortest round-trip text
    pub fn float(&mut self, value: f32) {
        self.push(value.to_string());
    }

    /// Enum field, as its discriminant
    pub fn enumeration<E: FieldEnum>(&mut self, value: E) {
        self.int(value.index());
    }

    /// Bool field, `t` or `f`
    pub fn boolean(&mut self, value: bool) {
        self.push(format_bool(value).to_string());
    }

    /// String field; record delimiters become `_`
    pub fn string(&mut self, value: &str) {
        self.push(value.replace([FIELD_SEPARATOR, RECORD_SEPARATOR], "_"));
    }

    /// 2D vector field
    pub fn vector2(&mut self, v: Vec2) {
        self.push(join(&v.to_array(), |c| c.to_string()));
    }

    /// 3D vector field
    pub fn vector3(&mut self, v: Vec3) {
        self.push(join(&v.to_array(), |c| c.to_string()));
    }

    /// 4D vector field
    pub fn vector4(&mut self, v: Vec4) {
        self.push(join(&v.to_array(), |c| c.to_string()));
    }

    /// Color field, at most 3 decimals per channel
    pub fn color(&mut self, c: Color) {
        self.push(join(&c.to_array(), |v| format_trimmed(v, COLOR_DECIMALS)));
    }

    /// Curve field: `pre;post;time,value,in,out,mode;...`
    pub fn curve(&mut self, curve: &AnimationCurve) {
        let mut text = format!("{};{}", curve.pre_wrap.index(), curve.post_wrap.index());
        for key in curve.keys() {
            text.push_str(&format!(
                ";{},{},{},{},{}",
                format_trimmed(key.time, KEY_TIME_DECIMALS),
                format_trimmed(key.value, CURVE_DECIMALS),
                format_trimmed(key.in_tangent, CURVE_DECIMALS),
                format_trimmed(key.out_tangent, CURVE_DECIMALS),
                key.tangent_mode
            ));
        }
        self.push(text);
    }

    /// Ramp field: `mode;time,r,g,b,a:...;time,alpha:...`
    pub fn ramp(&mut self, ramp: &ColorRamp) {
        let colors = ramp
            .color_keys()
            .iter()
            .map(|k| {
                let mut values = vec![format_trimmed(k.time, KEY_TIME_DECIMALS)];
                values.extend(k.color.iter().map(|&c| format_trimmed(c, COLOR_DECIMALS)));
                values.join(",")
            })
            .collect::<Vec<_>>()
            .join(":");
        let alphas = ramp
            .alpha_keys()
            .iter()
            .map(|k| {
                format!(
                    "{},{}",
                    format_trimmed(k.time, KEY_TIME_DECIMALS),
                    format_trimmed(k.alpha, COLOR_DECIMALS)
                )
            })
            .collect::<Vec<_>>()
            .join(":");
        self.push(format!("{};{colors};{alphas}", ramp.mode.index()));
    }
}

/// Ordered field source for one node record
#[derive(Debug)]
pub struct FieldReader<'a> {
    node: i32,
    fields: &'a [&'a str],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    /// Read `fields` for node `node`
    pub fn new(node: i32, fields: &'a [&'a str]) -> Self {
        Self { node, fields, pos: 0 }
    }

    /// Id of the node being read
    pub fn node(&self) -> i32 {
        self.node
    }

    fn next(&mut self) -> Result<&'a str, SerializeError> {
        let field = self.fields.get(self.pos).ok_or(SerializeError::MissingField {
            node: self.node,
            field: self.pos,
        })?;
        self.pos += 1;
        Ok(field)
    }

    /// Fail if fields remain unread
    pub fn finish(&self) -> Result<(), SerializeError> {
        if self.pos < self.fields.len() {
            return Err(SerializeError::TrailingFields {
                node: self.node,
                extra: self.fields.len() - self.pos,
            });
        }
        Ok(())
    }

    /// Integer field
    pub fn int(&mut self) -> Result<i32, SerializeError> {
        let text = self.next()?;
        parse_i32(self.node, text)
    }

    /// Float field
    pub fn float(&mut self) -> Result<f32, SerializeError> {
        let text = self.next()?;
        parse_f32(self.node, text)
    }

    /// Enum field
    pub fn enumeration<E: FieldEnum>(&mut self) -> Result<E, SerializeError> {
        let text = self.next()?;
        let index = parse_i32(self.node, text)?;
        E::from_index(index).ok_or_else(|| invalid(self.node, E::NAME, text))
    }

    /// Bool field
    pub fn boolean(&mut self) -> Result<bool, SerializeError> {
        let text = self.next()?;
        parse_bool(self.node, text)
    }

    /// String field
    pub fn string(&mut self) -> Result<String, SerializeError> {
        Ok(self.next()?.to_string())
    }

    /// 2D vector field
    pub fn vector2(&mut self) -> Result<Vec2, SerializeError> {
        let text = self.next()?;
        parse_components::<2>(self.node, text, "vector2").map(Vec2::from_array)
    }

    /// 3D vector field
    pub fn vector3(&mut self) -> Result<Vec3, SerializeError> {
        let text = self.next()?;
        parse_components::<3>(self.node, text, "vector3").map(Vec3::from_array)
    }

    /// 4D vector field
    pub fn vector4(&mut self) -> Result<Vec4, SerializeError> {
        let text = self.next()?;
        parse_components::<4>(self.node, text, "vector4").map(Vec4::from_array)
    }

    /// Color field
    pub fn color(&mut self) -> Result<Color, SerializeError> {
        let text = self.next()?;
        parse_components::<4>(self.node, text, "color").map(Color::from)
    }

    /// Curve field
    pub fn curve(&mut self) -> Result<AnimationCurve, SerializeError> {
        let node = self.node;
        let text = self.next()?;
        let mut parts = text.split(';');
        let (Some(pre), Some(post)) = (parts.next(), parts.next()) else {
            return Err(invalid(node, "curve", text));
        };

        let mut curve = AnimationCurve::default();
        curve.pre_wrap = parse_enum(node, pre)?;
        curve.post_wrap = parse_enum(node, post)?;
        for key in parts {
            let values: Vec<&str> = key.split(',').collect();
            let [time, value, in_tangent, out_tangent, mode] = values[..] else {
                return Err(invalid(node, "curve key", key));
            };
            let mut key = CurveKey::new(parse_f32(node, time)?, parse_f32(node, value)?)
                .with_tangents(parse_f32(node, in_tangent)?, parse_f32(node, out_tangent)?);
            key.tangent_mode = parse_i32(node, mode)?;
            curve.add_key(key);
        }
        Ok(curve)
    }

    /// Ramp field
    pub fn ramp(&mut self) -> Result<ColorRamp, SerializeError> {
        let node = self.node;
        let text = self.next()?;
        let parts: Vec<&str> = text.split(';').collect();
        let [mode, colors, alphas] = parts[..] else {
            return Err(invalid(node, "ramp", text));
        };

        let color_keys = split_keys(colors)
            .map(|key| {
                let [time, r, g, b, a] = parse_components::<5>(node, key, "color key")?;
                Ok(ColorKey {
                    time,
                    color: [r, g, b, a],
                })
            })
            .collect::<Result<Vec<_>, SerializeError>>()?;
        let alpha_keys = split_keys(alphas)
            .map(|key| {
                let [time, alpha] = parse_components::<2>(node, key, "alpha key")?;
                Ok(AlphaKey { time, alpha })
            })
            .collect::<Result<Vec<_>, SerializeError>>()?;
        Ok(ColorRamp::new(parse_enum(node, mode)?, color_keys, alpha_keys))
    }
}

fn parse_enum<E: FieldEnum>(node: i32, text: &str) -> Result<E, SerializeError> {
    E::from_index(parse_i32(node, text)?).ok_or_else(|| invalid(node, E::NAME, text))
}

fn split_keys(text: &str) -> impl Iterator<Item = &str> {
    text.split(':').filter(|k| !k.is_empty())
}

fn malformed(record: &str) -> SerializeError {
    SerializeError::MalformedRecord(record.to_string())
}

fn parse_position(record: &str, text: &str) -> Result<[f32; 2], SerializeError> {
    let mut cells = text.split(' ').map(|c| c.parse::<i32>());
    match (cells.next(), cells.next(), cells.next()) {
        (Some(Ok(x)), Some(Ok(y)), None) => Ok([x as f32 * GRID, y as f32 * GRID]),
        _ => Err(malformed(record)),
    }
}

fn encode_node(node: &Node) -> String {
    let mut record = format!("{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}", node.kind_id(), node.id);
    if let Some(custom) = node.kind.custom_serializer() {
        record.push_str(&custom.encode());
        return record;
    }

    let cells = node.position.map(|p| (p / GRID).round() as i32);
    record.push_str(&format!("{} {}{FIELD_SEPARATOR}", cells[0], cells[1]));
    let ids: Vec<String> = node.inputs.iter().map(|link| link.target.to_string()).collect();
    record.push_str(&ids.join(" "));

    let mut writer = FieldWriter::new();
    node.kind.write_fields(&mut writer);
    for field in writer.fields() {
        record.push(FIELD_SEPARATOR);
        record.push_str(field);
    }
    record
}

impl Graph {
    /// Serialize every node, skipping default nodes no link references
    pub fn to_text(&self) -> String {
        let used = self.get_used_defaults();
        self.nodes
            .values()
            .filter(|node| !node.is_default() || used.contains(&node.id))
            .map(encode_node)
            .collect::<Vec<_>>()
            .join(&RECORD_SEPARATOR.to_string())
    }

    /// Parse a graph using the built-in node kinds
    pub fn from_text(text: &str) -> Result<Self, SerializeError> {
        let mut graph = Self::default();
        graph.load_text(text)?;
        Ok(graph)
    }

    /// Replace every node with the serialized node set
    ///
    /// The whole text is parsed before anything is replaced; on error the
    /// graph is left untouched.
    pub fn load_text(&mut self, text: &str) -> Result<(), SerializeError> {
        let mut nodes = IndexMap::new();
        if !text.is_empty() {
            for record in text.split(RECORD_SEPARATOR) {
                let node = self.decode_node(record)?;
                if nodes.contains_key(&node.id) {
                    return Err(SerializeError::DuplicateId(node.id.0));
                }
                nodes.insert(node.id, node);
            }
        }

        let max_user = nodes.keys().filter(|id| id.is_user()).map(|id| id.0).max();
        let min_default = nodes.keys().filter(|id| id.is_default()).map(|id| id.0).min();
        self.next_id = max_user.map_or(1, |id| id + 1).max(1);
        self.next_default_id = min_default.map_or(-2, |id| id - 1).min(-2);
        debug!(nodes = nodes.len(), "Loaded graph text");
        self.replace_nodes(nodes);
        Ok(())
    }

    fn decode_node(&self, record: &str) -> Result<Node, SerializeError> {
        let parts: Vec<&str> = record.split(FIELD_SEPARATOR).collect();
        let [kind_id, id, payload @ ..] = &parts[..] else {
            return Err(malformed(record));
        };
        let id: i32 = id.parse().map_err(|_| malformed(record))?;
        let kind = self
            .registry
            .create(kind_id)
            .ok_or_else(|| SerializeError::UnknownKind(kind_id.to_string()))?;
        let mut node = Node::new(NodeId(id), kind);

        if let Some(custom) = node.kind.custom_serializer_mut() {
            custom.decode(id, payload)?;
            node.configure();
            return Ok(node);
        }

        let [position, ids, fields @ ..] = payload else {
            return Err(malformed(record));
        };
        node.position = parse_position(record, position)?;

        let mut reader = FieldReader::new(id, fields);
        node.kind.read_fields(&mut reader)?;
        reader.finish()?;
        node.configure();

        let targets = ids
            .split(' ')
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<i32>().map(NodeId).map_err(|_| malformed(record)))
            .collect::<Result<Vec<_>, _>>()?;
        if node.inputs.len() < targets.len() {
            crate::link::resize_inputs(&mut node.inputs, targets.len());
        }
        for (link, target) in node.inputs.iter_mut().zip(targets) {
            link.target = target;
            if target.is_default() {
                link.last_default = target;
            }
        }
        Ok(node)
    }
}
