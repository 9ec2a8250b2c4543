//! Deferred client-side scripts.
//!
//! Function-valued chart options cannot be expressed in JSON. They are
//! carried through the option tree as marker-wrapped strings and spliced in
//! as bare function source by [`dump_options`]. Nothing here is ever
//! evaluated server-side.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{ChartError, ChartResult};

/// Marker wrapped around deferred scripts produced by this crate.
pub const JS_MARKER: &str = "__JSCODE__";

/// Marker used by older stored chart configs.
pub const LEGACY_JS_MARKER: &str = "--x_x--0_0--";

static JS_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""__JSCODE__(.*?)__JSCODE__""#).unwrap());

static LEGACY_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""--x_x--0_0--(.*?)--x_x--0_0--""#).unwrap());

/// A client-side function, kept as source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsFunction(String);

impl JsFunction {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn source(&self) -> &str {
        &self.0
    }

    /// The marker-wrapped form stored in the option tree.
    pub fn marked(&self) -> String {
        format!("{JS_MARKER}{}{JS_MARKER}", self.0)
    }
}

impl From<JsFunction> for Value {
    fn from(f: JsFunction) -> Self {
        Value::String(f.marked())
    }
}

impl fmt::Display for JsFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Number format applied by the client formatter runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    #[default]
    None,
    Integer,
    Float1,
    Float2,
    Percent,
    Currency,
    Custom,
}

impl FormatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatType::None => "none",
            FormatType::Integer => "integer",
            FormatType::Float1 => "float1",
            FormatType::Float2 => "float2",
            FormatType::Percent => "percent",
            FormatType::Currency => "currency",
            FormatType::Custom => "custom",
        }
    }

    /// Parse leniently; anything unrecognized formats as `none`.
    pub fn lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for FormatType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(FormatType::None),
            "integer" => Ok(FormatType::Integer),
            "float1" => Ok(FormatType::Float1),
            "float2" => Ok(FormatType::Float2),
            "percent" => Ok(FormatType::Percent),
            "currency" => Ok(FormatType::Currency),
            "custom" => Ok(FormatType::Custom),
            other => Err(format!("unknown format type: {}", other)),
        }
    }
}

/// Where a formatter is attached; decides the callback signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatterMode {
    /// `function(value)` on axis labels.
    Axis,
    /// `function(params)` on series labels.
    Series,
}

/// Escape text for embedding inside a single-quoted JS string literal.
pub fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}

pub fn is_function_source(s: &str) -> bool {
    s.trim_start().starts_with("function")
}

pub fn is_marked(s: &str) -> bool {
    s.contains(JS_MARKER) || s.contains(LEGACY_JS_MARKER)
}

/// User-supplied formatter text: function source becomes a deferred script,
/// anything else stays a template string.
pub fn formatter_value(s: &str) -> Value {
    if is_function_source(s) && !is_marked(s) {
        JsFunction::new(s).into()
    } else {
        Value::String(s.to_string())
    }
}

/// Append `suffix` to a template formatter. Function formatters are left alone.
pub fn apply_suffix(fmt: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return fmt.to_string();
    }
    if fmt.is_empty() {
        return format!("{{value}}{suffix}");
    }
    if is_function_source(fmt) || is_marked(fmt) {
        return fmt.to_string();
    }
    format!("{fmt}{suffix}")
}

/// Build the label or axis formatter for a number format and suffix.
///
/// Returns a template string (`{value}`, `{c}`) when no client formatting is
/// needed, otherwise a deferred call into `window.biFormatter`.
pub fn js_formatter(format: FormatType, script: &str, suffix: &str, mode: FormatterMode) -> Value {
    let safe_suffix = escape_js(suffix);
    let (arg, call, fallback) = match mode {
        FormatterMode::Axis => ("value", "formatAxis", "value"),
        FormatterMode::Series => ("params", "formatSeries", "params.value"),
    };

    match format {
        FormatType::Custom if !script.trim().is_empty() => {
            if is_function_source(script) {
                return JsFunction::new(script).into();
            }
            let safe_script = escape_js(script);
            JsFunction::new(format!(
                "function({arg}){{ try {{ return window.biFormatter.{call}({arg}, 'custom', '{safe_suffix}', '{safe_script}'); }} catch(e) {{ return {fallback}; }} }}"
            ))
            .into()
        }
        FormatType::Custom => Value::String(template(mode, suffix)),
        FormatType::None if !suffix.is_empty() => JsFunction::new(format!(
            "function({arg}){{ try {{ return window.biFormatter.{call}({arg}, 'none', '{safe_suffix}'); }} catch(e) {{ return {fallback} + '{safe_suffix}'; }} }}"
        ))
        .into(),
        FormatType::None => Value::String(template(mode, "")),
        numeric => JsFunction::new(format!(
            "function({arg}){{ try {{ return window.biFormatter.{call}({arg}, '{}', '{safe_suffix}'); }} catch(e) {{ return {fallback}; }} }}",
            numeric.as_str()
        ))
        .into(),
    }
}

fn template(mode: FormatterMode, suffix: &str) -> String {
    match mode {
        FormatterMode::Axis => format!("{{value}}{suffix}"),
        FormatterMode::Series => format!("{{c}}{suffix}"),
    }
}

// ============================================================================
// Generated tooltip and symbol scripts
// ============================================================================

/// Tooltip for percent-stacked charts: every value shown with two decimals and `%`.
pub fn percent_tooltip() -> JsFunction {
    JsFunction::new(
        "function(params){ let res = ''; \
         if (Array.isArray(params)) { if (params.length > 0) { res += params[0].name + '<br/>'; } \
         params.forEach(item => { let val = item.value; if (Array.isArray(val)) { val = val[val.length - 1]; } \
         if (typeof val === 'number') { val = val.toFixed(2) + '%'; } \
         res += item.marker + item.seriesName + ': ' + val + '<br/>'; }); } \
         else { let val = params.value; if (Array.isArray(val)) { val = val[val.length - 1]; } \
         if (typeof val === 'number') { val = val.toFixed(2) + '%'; } \
         res += params.marker + params.name + ': ' + val; } \
         return res; }",
    )
}

/// Tooltip that formats each series through its entry in `config_map`
/// (`{seriesName: {type, suffix, script?}}`), falling back to the global suffix.
pub fn series_tooltip(config_map: &Map<String, Value>, global_suffix: &str) -> JsFunction {
    let map = Value::Object(config_map.clone()).to_string();
    let suffix = escape_js(global_suffix);
    JsFunction::new(format!(
        "function(params){{ try {{ const configMap = {map}; let res = ''; \
         if (Array.isArray(params)) {{ if (params.length > 0) {{ res += params[0].name + '<br/>'; }} \
         params.forEach(item => {{ const cfg = configMap[item.seriesName] || {{ 'type': 'none', 'suffix': '{suffix}' }}; \
         let formatted = item.value; try {{ if (window.biFormatter && window.biFormatter.formatTooltip) {{ \
         formatted = window.biFormatter.formatTooltip(item, cfg.type, cfg.suffix, cfg.script); }} \
         else if (Array.isArray(item.value) && item.value.length > 2) {{ formatted = item.value[2]; }} }} catch (e) {{ }} \
         res += item.marker + item.seriesName + ': ' + formatted + '<br/>'; }}); }} \
         else {{ const cfg = configMap[params.seriesName] || {{ 'type': 'none', 'suffix': '{suffix}' }}; \
         let formatted = params.value; try {{ if (window.biFormatter && window.biFormatter.formatTooltip) {{ \
         formatted = window.biFormatter.formatTooltip(params, cfg.type, cfg.suffix, cfg.script); }} \
         else if (Array.isArray(params.value) && params.value.length > 2) {{ formatted = params.value[2]; }} }} catch (e) {{ }} \
         res += params.marker + params.name + ': ' + formatted; \
         if (params.percent !== undefined) {{ res += ' (' + params.percent + '%)'; }} }} \
         return res; }} catch (e) {{ return ''; }} }}"
    ))
}

/// Tooltip for `[x, y, value]` matrix points (heatmap, scatter matrix).
pub fn matrix_tooltip(config_map: &Map<String, Value>, global_suffix: &str) -> JsFunction {
    let map = Value::Object(config_map.clone()).to_string();
    let suffix = escape_js(global_suffix);
    JsFunction::new(format!(
        "function(params){{ try {{ const configMap = {map}; \
         let item = Array.isArray(params) ? params[0] : params; \
         if (!item.value || item.value.length < 3) return ''; \
         let val = item.value[2]; let seriesName = item.seriesName; \
         const cfg = configMap[seriesName] || {{ 'type': 'none', 'suffix': '{suffix}' }}; \
         let formatted = val; \
         if (window.biFormatter && window.biFormatter.formatTooltip) {{ \
         let proxyItem = {{ value: val, seriesName: seriesName, name: item.name }}; \
         formatted = window.biFormatter.formatTooltip(proxyItem, cfg.type, cfg.suffix, cfg.script); }} \
         else if (val !== undefined && val !== null) {{ formatted = val + cfg.suffix; }} \
         return item.marker + item.name + '<br/>' + seriesName + ': ' + formatted; \
         }} catch (e) {{ return ''; }} }}"
    ))
}

/// Bubble size proportional to the third coordinate, clamped below by `min_size`.
pub fn matrix_symbol_size(min_size: f64, max_size: f64, max_value: f64) -> JsFunction {
    JsFunction::new(format!(
        "function (val) {{ try {{ if (!val || val.length < 3) return {min_size}; \
         var size = (val[2] / {max_value}) * {max_size}; return Math.max(size, {min_size}); }} \
         catch(e) {{ return {min_size}; }} }}"
    ))
}

/// Label showing the third coordinate of a matrix point, optionally formatted.
pub fn matrix_label(format: Option<(FormatType, &str)>) -> JsFunction {
    match format {
        Some((format, suffix)) => {
            let suffix = escape_js(suffix);
            JsFunction::new(format!(
                "function(p){{ try {{ var val = (p && p.data && p.data.length > 2) ? p.data[2] : null; \
                 if (val === null) return ''; if (window.biFormatter && window.biFormatter.format) {{ \
                 return window.biFormatter.format(val, '{}') + '{suffix}'; }} return val; }} \
                 catch (e) {{ return (p && p.data && p.data.length > 2) ? p.data[2] : ''; }} }}",
                format.as_str()
            ))
        }
        None => JsFunction::new(
            "function(p){return (p && p.data && p.data.length > 2) ? p.data[2] : '';}",
        ),
    }
}

// ============================================================================
// Serialization
// ============================================================================

fn unwrap_marked(caps: &Captures<'_>) -> String {
    let escaped = &caps[1];
    serde_json::from_str::<String>(&format!("\"{escaped}\""))
        .unwrap_or_else(|_| escaped.to_string())
}

/// Serialize an option tree, splicing every deferred script in as bare source.
pub fn dump_options(options: &Value) -> ChartResult<String> {
    let json = serde_json::to_string(options).map_err(|e| ChartError::Serialize(e.to_string()))?;
    let json = JS_MARKER_RE.replace_all(&json, unwrap_marked);
    let json = LEGACY_MARKER_RE.replace_all(&json, unwrap_marked);
    Ok(json.into_owned())
}
