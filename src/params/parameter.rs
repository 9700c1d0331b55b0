use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::fmt;

use crate::error::{RemeshError, Result};

const STEP_TOLERANCE: f64 = 1e-9;
const CHOICE_TOLERANCE: f64 = 1e-12;

/// Kind of value a parameter holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Number,
    String,
}

/// Current value of a parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Number(_) => ParamKind::Number,
            ParamValue::Text(_) => ParamKind::String,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            ParamValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Number(_) => None,
            ParamValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{}", v),
            ParamValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> ParamValue {
        ParamValue::Number(v)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> ParamValue {
        ParamValue::Text(s.to_string())
    }
}

/// Admissible values of a parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Free,
    Range {
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
    },
    Choices(Vec<f64>),
    TextChoices(Vec<String>),
}

/// Named, constrained, user-tunable setting
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    value: ParamValue,
    constraint: Constraint,
}

impl Parameter {
    /// Unconstrained number parameter
    pub fn number(name: &str, default: f64) -> Parameter {
        Parameter {
            name: name.to_string(),
            value: ParamValue::Number(default),
            constraint: Constraint::Free,
        }
    }

    /// Unconstrained string parameter
    pub fn text(name: &str, default: &str) -> Parameter {
        Parameter {
            name: name.to_string(),
            value: ParamValue::Text(default.to_string()),
            constraint: Constraint::Free,
        }
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>, step: Option<f64>) -> Parameter {
        self.constraint = Constraint::Range { min, max, step };
        self
    }

    pub fn with_choices(mut self, choices: Vec<f64>) -> Parameter {
        self.constraint = Constraint::Choices(choices);
        self
    }

    pub fn with_text_choices(mut self, choices: Vec<String>) -> Parameter {
        self.constraint = Constraint::TextChoices(choices);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    pub fn kind(&self) -> ParamKind {
        self.value.kind()
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// Checks a candidate value against kind and constraints
    pub fn validate(&self, value: &ParamValue) -> Result<()> {
        if value.kind() != self.kind() {
            return Err(RemeshError::validation(
                &self.name,
                format!("expected a {:?} value, got {}", self.kind(), value),
            ));
        }

        match (value, &self.constraint) {
            (ParamValue::Number(v), _) if !v.is_finite() => Err(RemeshError::validation(
                &self.name,
                format!("{} is not a finite number", v),
            )),
            (_, Constraint::Free) => Ok(()),
            (ParamValue::Number(v), Constraint::Range { min, max, step }) => {
                if let Some(min) = min {
                    if v < min {
                        return Err(RemeshError::validation(
                            &self.name,
                            format!("{} is below minimum {}", v, min),
                        ));
                    }
                }
                if let Some(max) = max {
                    if v > max {
                        return Err(RemeshError::validation(
                            &self.name,
                            format!("{} is above maximum {}", v, max),
                        ));
                    }
                }
                if let Some(step) = step {
                    if *step > 0.0 {
                        let k = (v - min.unwrap_or(0.0)) / step;
                        if (k - k.round()).abs() > STEP_TOLERANCE {
                            return Err(RemeshError::validation(
                                &self.name,
                                format!("{} is not on the step grid of {}", v, step),
                            ));
                        }
                    }
                }
                Ok(())
            }
            (ParamValue::Number(v), Constraint::Choices(choices)) => {
                if choices.iter().any(|c| (c - v).abs() <= CHOICE_TOLERANCE) {
                    Ok(())
                } else {
                    Err(RemeshError::validation(
                        &self.name,
                        format!("{} is not one of {:?}", v, choices),
                    ))
                }
            }
            (ParamValue::Text(s), Constraint::TextChoices(choices)) => {
                if choices.iter().any(|c| c == s) {
                    Ok(())
                } else {
                    Err(RemeshError::validation(
                        &self.name,
                        format!("\"{}\" is not one of {:?}", s, choices),
                    ))
                }
            }
            _ => Err(RemeshError::validation(
                &self.name,
                "constraint does not apply to this kind of value",
            )),
        }
    }

    /// Replaces the value, leaving it untouched when validation fails
    pub(crate) fn assign(&mut self, value: ParamValue) -> Result<()> {
        self.validate(&value)?;
        self.value = value;
        Ok(())
    }

    /// Parses text according to the declared kind
    pub fn parse_value(&self, raw: &str) -> Result<ParamValue> {
        match self.kind() {
            ParamKind::Number => raw
                .trim()
                .parse::<f64>()
                .map(ParamValue::Number)
                .map_err(|_| RemeshError::validation(&self.name, format!("`{}` is not a number", raw.trim()))),
            ParamKind::String => {
                let raw = raw.trim();
                let unquoted = raw
                    .strip_prefix('"')
                    .and_then(|r| r.strip_suffix('"'))
                    .unwrap_or(raw);
                Ok(ParamValue::Text(unquoted.to_string()))
            }
        }
    }

    /// ONELAB-style JSON view
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        match &self.value {
            ParamValue::Number(v) => {
                obj.insert("type".into(), json!("number"));
                obj.insert("name".into(), json!(self.name));
                obj.insert("values".into(), json!([v]));
            }
            ParamValue::Text(s) => {
                obj.insert("type".into(), json!("string"));
                obj.insert("name".into(), json!(self.name));
                obj.insert("values".into(), json!([s]));
            }
        }
        match &self.constraint {
            Constraint::Free => {}
            Constraint::Range { min, max, step } => {
                if let Some(min) = min {
                    obj.insert("min".into(), json!(min));
                }
                if let Some(max) = max {
                    obj.insert("max".into(), json!(max));
                }
                if let Some(step) = step {
                    obj.insert("step".into(), json!(step));
                }
            }
            Constraint::Choices(c) => {
                obj.insert("choices".into(), json!(c));
            }
            Constraint::TextChoices(c) => {
                obj.insert("choices".into(), json!(c));
            }
        }
        Value::Object(obj)
    }
}

/// Declaration as found in a ONELAB parameter list
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum ParameterDecl {
    Number {
        name: String,
        values: Vec<f64>,
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
        choices: Option<Vec<f64>>,
    },
    String {
        name: String,
        #[serde(default)]
        values: Vec<String>,
        choices: Option<Vec<String>>,
    },
}

impl ParameterDecl {
    pub(crate) fn into_parameter(self) -> Result<Parameter> {
        match self {
            ParameterDecl::Number {
                name,
                values,
                min,
                max,
                step,
                choices,
            } => {
                let default = *values
                    .first()
                    .ok_or_else(|| RemeshError::validation(&name, "declaration has no default value"))?;
                let param = Parameter::number(&name, default);
                match choices {
                    Some(choices) => Ok(param.with_choices(choices)),
                    None if min.is_some() || max.is_some() || step.is_some() => {
                        Ok(param.with_range(min, max, step))
                    }
                    None => Ok(param),
                }
            }
            ParameterDecl::String {
                name,
                values,
                choices,
            } => {
                let default = values.first().map(String::as_str).unwrap_or("");
                let param = Parameter::text(&name, default);
                match choices {
                    Some(choices) => Ok(param.with_text_choices(choices)),
                    None => Ok(param),
                }
            }
        }
    }
}
