use crate::error::Result;
use crate::params::ParameterStore;

pub const ANGLE: &str = "Parameters/Angle for surface detection";
pub const FORCE_PARAMETRIZABLE: &str = "Parameters/Create surfaces guaranteed to be parametrizable";
pub const FUNNY_FIELD: &str = "Parameters/Apply funny mesh size field?";
pub const FORCE_PARAMETRIZABLE_SIZED: &str = "Parameters/Create parametrizable surfaces";

/// Token written by the event source, cleared by the loop
pub const ACTION: &str = "ONELAB/Action";
pub const CHECK: &str = "check";

const ACTION_JSON: &str = r#"[
  {
    "type":"string",
    "name":"ONELAB/Action",
    "values":[""]
  }
]"#;

const FIELD_JSON: &str = r#"[
  {
    "type":"number",
    "name":"Parameters/Angle for surface detection",
    "values":[40],
    "min":20,
    "max":120,
    "step":1
  },
  {
    "type":"number",
    "name":"Parameters/Create surfaces guaranteed to be parametrizable",
    "values":[0],
    "choices":[0, 1]
  },
  {
    "type":"number",
    "name":"Parameters/Apply funny mesh size field?",
    "values":[0],
    "choices":[0, 1]
  }
]"#;

const SIZED_JSON: &str = r#"[
  {
    "type":"number",
    "name":"Parameters/Angle for surface detection",
    "values":[40],
    "min":20,
    "max":120,
    "step":1
  },
  {
    "type":"number",
    "name":"Parameters/Create parametrizable surfaces",
    "values":[0],
    "choices":[0, 1]
  }
]"#;

/// Store holding the parameters of the background field program
pub fn field_parameters() -> Result<ParameterStore> {
    let mut store = ParameterStore::new();
    store.declare_json(FIELD_JSON)?;
    store.declare_json(ACTION_JSON)?;
    Ok(store)
}

/// Store holding the parameters of the explicit size program
pub fn sized_parameters() -> Result<ParameterStore> {
    let mut store = ParameterStore::new();
    store.declare_json(SIZED_JSON)?;
    store.declare_json(ACTION_JSON)?;
    Ok(store)
}
