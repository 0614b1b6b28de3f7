//! Template-based formatter
//!
//! A template is literal text interleaved with tokens: `{token}`,
//! `{token<N}` (left align) or `{token>N}` (right align), width N in
//! 1..=254. Recognized tokens: `name`, `basename`, `time`, `timems`,
//! `timeus`, `level`, `message`. Compilation happens once, up front;
//! rendering walks the compiled token list.

use super::{color, Formatter};
use crate::core::{Level, LogError, Record, Result};
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static TOKEN_PTN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]+\}").expect("static pattern"));
// e.g. "{name<20}" - left align, width 20
static SPEC_PTN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{([^}]+?)(?:([<>])(\d+))?\}$").expect("static pattern"));

const MAX_FIELD_WIDTH: usize = 254;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Time,
    TimeMillis,
    TimeMicros,
    Name,
    Basename,
    Level,
    Message,
}

fn field_for(name: &str) -> Option<Field> {
    match name {
        "time" => Some(Field::Time),
        "timems" => Some(Field::TimeMillis),
        "timeus" => Some(Field::TimeMicros),
        "name" => Some(Field::Name),
        "basename" => Some(Field::Basename),
        "level" => Some(Field::Level),
        "message" => Some(Field::Message),
        _ => None,
    }
}

#[derive(Debug, Clone)]
enum Token {
    Literal(String),
    Field {
        field: Field,
        width: Option<(usize, Align)>,
    },
}

/// A named pattern for message sub-span coloring.
#[derive(Debug, Clone)]
pub struct PatternColor {
    pub name: String,
    pub pattern: Regex,
}

impl PatternColor {
    pub fn new(name: impl Into<String>, pattern: Regex) -> Self {
        Self {
            name: name.into(),
            pattern,
        }
    }
}

#[derive(Debug, Clone)]
struct PatternColoring {
    colors: HashMap<String, String>,
    patterns: Vec<PatternColor>,
}

/// Formatter rendering records through a compiled string template.
#[derive(Debug, Clone)]
pub struct TemplateFormatter {
    template: String,
    tokens: Vec<Token>,
    level_colors: Option<HashMap<Level, String>>,
    pattern_colors: Option<PatternColoring>,
}

impl TemplateFormatter {
    pub fn new(template: &str) -> Result<Self> {
        let mut formatter = Self {
            template: String::new(),
            tokens: Vec::new(),
            level_colors: None,
            pattern_colors: None,
        };
        formatter.set_format(template)?;
        Ok(formatter)
    }

    /// Compile `template` into the token list used at render time.
    ///
    /// Fails fast on a template without any token and on unknown token
    /// names; the formatter keeps its previous format in that case.
    pub fn set_format(&mut self, template: &str) -> Result<()> {
        let mut tokens = Vec::new();
        let mut last = 0;
        let mut found = false;

        for spot in TOKEN_PTN.find_iter(template) {
            found = true;
            if spot.start() > last {
                tokens.push(Token::Literal(template[last..spot.start()].to_string()));
            }
            last = spot.end();

            let caps = match SPEC_PTN.captures(spot.as_str()) {
                Some(caps) => caps,
                None => return Err(LogError::invalid_template(template)),
            };

            let name = &caps[1];
            let field = match field_for(name) {
                Some(field) => field,
                None => return Err(LogError::unknown_token(name)),
            };

            let width = match (caps.get(2), caps.get(3)) {
                (Some(align), Some(width)) => {
                    let align = if align.as_str() == ">" {
                        Align::Right
                    } else {
                        Align::Left
                    };
                    let width = width
                        .as_str()
                        .parse::<usize>()
                        .unwrap_or(0)
                        .min(MAX_FIELD_WIDTH);
                    if width > 0 {
                        Some((width, align))
                    } else {
                        None
                    }
                }
                _ => None,
            };

            tokens.push(Token::Field { field, width });
        }

        if !found {
            return Err(LogError::invalid_template(template));
        }
        if last < template.len() {
            tokens.push(Token::Literal(template[last..].to_string()));
        }

        self.template = template.to_string();
        self.tokens = tokens;
        Ok(())
    }

    /// The template string this formatter was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Enable or disable the default level-based line coloring.
    pub fn enable_level_coloring(&mut self, enable: bool) {
        self.level_colors = if enable {
            Some(default_level_colors())
        } else {
            None
        };
    }

    /// Set an explicit level-to-color map, `None` to disable.
    pub fn set_level_coloring(&mut self, colors: Option<HashMap<Level, String>>) {
        self.level_colors = colors;
    }

    /// Enable or disable the default pattern-based message coloring.
    pub fn enable_pattern_coloring(&mut self, enable: bool) {
        self.pattern_colors = if enable {
            Some(default_pattern_coloring())
        } else {
            None
        };
    }

    /// Set the color table and the ordered patterns using it.
    ///
    /// Patterns run in order over the already-rewritten message, so a
    /// pattern matching `[` must come first: later patterns would otherwise
    /// match the escape sequences inserted by earlier ones.
    pub fn set_pattern_coloring(
        &mut self,
        colors: HashMap<String, String>,
        patterns: Vec<PatternColor>,
    ) {
        self.pattern_colors = Some(PatternColoring { colors, patterns });
    }

    /// Rewrite message sub-spans: each match is wrapped in its pattern's
    /// color followed by the line's base color, so trailing text returns to
    /// the base color rather than terminal default.
    fn colorize_message(&self, message: &str, base_color: &str) -> String {
        let coloring = match &self.pattern_colors {
            Some(coloring) => coloring,
            None => return message.to_string(),
        };

        let mut message = message.to_string();
        for pattern in &coloring.patterns {
            if let Some(code) = coloring.colors.get(&pattern.name) {
                let replacement = format!("{}${{1}}{}", code, base_color);
                message = pattern
                    .pattern
                    .replace_all(&message, replacement.as_str())
                    .into_owned();
            }
        }
        message
    }
}

impl Formatter for TemplateFormatter {
    fn format(&self, record: &Record) -> Result<Vec<u8>> {
        let mut out = String::with_capacity(self.template.len() + record.message.len());

        let (base_color, color_set) = match &self.level_colors {
            Some(colors) => match colors.get(&record.level) {
                Some(code) => (code.as_str(), true),
                None => (color::RESET, false),
            },
            None => ("", false),
        };
        if color_set {
            out.push_str(base_color);
        }

        // pattern coloring runs once even if {message} appears twice
        let mut processed_message: Option<String> = None;

        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Field { field, width } => {
                    let value = match field {
                        Field::Time => format_time(&record.timestamp, TimeResolution::Seconds),
                        Field::TimeMillis => format_time(&record.timestamp, TimeResolution::Millis),
                        Field::TimeMicros => format_time(&record.timestamp, TimeResolution::Micros),
                        Field::Name => display_name(&record.name).to_string(),
                        Field::Basename => {
                            let base = record.basename();
                            display_name(base).to_string()
                        }
                        Field::Level => record.level.name().to_string(),
                        Field::Message => match &processed_message {
                            Some(message) => message.clone(),
                            None => {
                                let message =
                                    self.colorize_message(&record.message, base_color);
                                processed_message = Some(message.clone());
                                message
                            }
                        },
                    };
                    if !value.is_empty() {
                        push_aligned(&mut out, &value, *width);
                    }
                }
            }
        }

        if color_set {
            out.push_str(color::RESET);
        }

        Ok(out.into_bytes())
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "root"
    } else {
        name
    }
}

enum TimeResolution {
    Seconds,
    Millis,
    Micros,
}

fn format_time(timestamp: &DateTime<Local>, resolution: TimeResolution) -> String {
    let format = match resolution {
        TimeResolution::Seconds => "%Y-%m-%d %H:%M:%S",
        TimeResolution::Millis => "%Y-%m-%d %H:%M:%S%.3f",
        TimeResolution::Micros => "%Y-%m-%d %H:%M:%S%.6f",
    };
    timestamp.format(format).to_string()
}

/// Pad a short value (space fill, per alignment) or hard-truncate a long one
/// to exactly the declared width. Truncation is silent by design.
fn push_aligned(out: &mut String, value: &str, width: Option<(usize, Align)>) {
    let (width, align) = match width {
        Some(width) => width,
        None => {
            out.push_str(value);
            return;
        }
    };

    let len = value.chars().count();
    if len > width {
        out.extend(value.chars().take(width));
        return;
    }

    match align {
        Align::Left => {
            out.push_str(value);
            for _ in len..width {
                out.push(' ');
            }
        }
        Align::Right => {
            for _ in len..width {
                out.push(' ');
            }
            out.push_str(value);
        }
    }
}

fn default_level_colors() -> HashMap<Level, String> {
    HashMap::from([
        (Level::Fatal, format!("{}{}", color::RED_BG, color::BOLD)),
        (Level::Error, color::RED.to_string()),
        (Level::Warning, color::YELLOW.to_string()),
        (Level::Info, color::NORMAL.to_string()),
        (Level::Debug, color::FAINT.to_string()),
    ])
}

fn default_pattern_coloring() -> PatternColoring {
    PatternColoring {
        colors: HashMap::from([
            ("brackets".to_string(), color::PURPLE.to_string()),
            ("punct".to_string(), color::BLUE.to_string()),
            ("quoted".to_string(), color::GREEN.to_string()),
        ]),
        patterns: vec![
            // all kinds of brackets; must stay first, see set_pattern_coloring
            PatternColor::new(
                "brackets",
                Regex::new(r"([<>\]\(\)\{\}]|\[)").expect("static pattern"),
            ),
            PatternColor::new("punct", Regex::new(r"([-/\*\+\.,:])").expect("static pattern")),
            PatternColor::new(
                "quoted",
                Regex::new(r#"('[^']+'|"[^"]+")"#).expect("static pattern"),
            ),
        ],
    }
}
