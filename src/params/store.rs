use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{RemeshError, Result};
use crate::params::parameter::{ParamValue, Parameter, ParameterDecl};

/// Registry of user-tunable parameters
///
/// Built once at startup and handed by reference to the builder and the
/// interactive loop. Values only change through validated setters.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    params: BTreeMap<String, Parameter>,
}

impl ParameterStore {
    pub fn new() -> ParameterStore {
        ParameterStore {
            params: BTreeMap::new(),
        }
    }

    /// Registers a parameter with its default value
    pub fn declare(&mut self, param: Parameter) -> Result<()> {
        if self.params.contains_key(param.name()) {
            return Err(RemeshError::AlreadyDeclared {
                name: param.name().to_string(),
            });
        }
        param.validate(param.value())?;
        log::debug!("declare {} = {}", param.name(), param.value());
        self.params.insert(param.name().to_string(), param);
        Ok(())
    }

    /// Registers every parameter of a ONELAB-style JSON list
    pub fn declare_json(&mut self, text: &str) -> Result<()> {
        let decls: Vec<ParameterDecl> = serde_json::from_str(text)
            .map_err(|e| RemeshError::validation("<declaration>", e))?;
        for decl in decls {
            self.declare(decl.into_parameter()?)?;
        }
        Ok(())
    }

    pub fn parameter(&self, name: &str) -> Result<&Parameter> {
        self.params.get(name).ok_or_else(|| RemeshError::NotFound {
            name: name.to_string(),
        })
    }

    pub fn get(&self, name: &str) -> Result<ParamValue> {
        Ok(self.parameter(name)?.value().clone())
    }

    pub fn get_number(&self, name: &str) -> Result<f64> {
        let param = self.parameter(name)?;
        param
            .value()
            .as_number()
            .ok_or_else(|| RemeshError::validation(name, "not a number parameter"))
    }

    /// Number parameter read as a flag (non-zero is set)
    pub fn get_bool(&self, name: &str) -> Result<bool> {
        Ok(self.get_number(name)? != 0.0)
    }

    pub fn get_string(&self, name: &str) -> Result<String> {
        let param = self.parameter(name)?;
        param
            .value()
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RemeshError::validation(name, "not a string parameter"))
    }

    /// Overwrites a value; the previous value survives a failed validation
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<()> {
        let param = self.params.get_mut(name).ok_or_else(|| RemeshError::NotFound {
            name: name.to_string(),
        })?;
        param.assign(value)?;
        log::debug!("set {} = {}", name, param.value());
        Ok(())
    }

    pub fn set_number(&mut self, name: &str, value: f64) -> Result<()> {
        self.set(name, ParamValue::Number(value))
    }

    pub fn set_string(&mut self, name: &str, value: &str) -> Result<()> {
        self.set(name, ParamValue::Text(value.to_string()))
    }

    /// Parses `raw` per the declared kind, then sets it
    pub fn set_from_str(&mut self, name: &str, raw: &str) -> Result<()> {
        let value = self.parameter(name)?.parse_value(raw)?;
        self.set(name, value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.values()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// ONELAB-style JSON dump of all parameters
    pub fn to_json(&self) -> Value {
        Value::Array(self.iter().map(Parameter::to_json).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECL: &str = r#"[
      {"type":"number","name":"P/Angle","values":[40],"min":20,"max":120,"step":1},
      {"type":"number","name":"P/Flag","values":[0],"choices":[0, 1]},
      {"type":"string","name":"ONELAB/Action","values":[""]}
    ]"#;

    fn store() -> ParameterStore {
        let mut store = ParameterStore::new();
        store.declare_json(DECL).unwrap();
        store
    }

    #[test]
    fn declared_defaults_are_readable() {
        let store = store();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get_number("P/Angle").unwrap(), 40.0);
        assert!(!store.get_bool("P/Flag").unwrap());
        assert_eq!(store.get_string("ONELAB/Action").unwrap(), "");
    }

    #[test]
    fn unknown_parameter_is_not_found() {
        let mut store = store();
        assert!(matches!(store.get("P/Missing"), Err(RemeshError::NotFound { .. })));
        assert!(matches!(
            store.set_number("P/Missing", 1.0),
            Err(RemeshError::NotFound { .. })
        ));
    }

    #[test]
    fn second_declaration_is_rejected() {
        let mut store = store();
        let err = store.declare(Parameter::number("P/Angle", 50.0)).unwrap_err();
        assert!(matches!(err, RemeshError::AlreadyDeclared { .. }));
        assert_eq!(store.get_number("P/Angle").unwrap(), 40.0);
    }

    #[test]
    fn invalid_default_is_rejected() {
        let mut store = ParameterStore::new();
        let err = store
            .declare_json(r#"[{"type":"number","name":"P/A","values":[5],"min":20}]"#)
            .unwrap_err();
        assert!(matches!(err, RemeshError::Validation { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_json_is_a_validation_error() {
        let mut store = ParameterStore::new();
        assert!(matches!(
            store.declare_json("[{\"type\":\"number\"}]"),
            Err(RemeshError::Validation { .. })
        ));
    }

    #[test]
    fn failed_set_keeps_previous_value() {
        let mut store = store();
        store.set_number("P/Angle", 60.0).unwrap();
        assert!(store.set_number("P/Angle", 200.0).is_err());
        assert!(store.set_string("P/Angle", "60").is_err());
        assert_eq!(store.get_number("P/Angle").unwrap(), 60.0);
    }

    #[test]
    fn set_from_str_parses_by_kind() {
        let mut store = store();
        store.set_from_str("P/Flag", "1").unwrap();
        assert!(store.get_bool("P/Flag").unwrap());
        store.set_from_str("ONELAB/Action", "check").unwrap();
        assert_eq!(store.get_string("ONELAB/Action").unwrap(), "check");
    }

    #[test]
    fn json_dump_lists_every_parameter() {
        let dump = store().to_json();
        let names: Vec<&str> = dump
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["ONELAB/Action", "P/Angle", "P/Flag"]);
    }
}
