//! Element configuration and handler binding.
//!
//! Every element is built from an [`ElementConfig`]: an optional display name
//! plus the arguments captured at construction time. At call time the
//! [`Binder`] hands the handler the runtime argument (usually the frame)
//! followed by the captured arguments:
//!
//! ```text
//! handler(frame, &captured)            plain handler
//! method(&mut receiver, frame, &captured)   handler bound to a receiver
//! ```
//!
//! Receiver binding is explicit: element constructors named `bound` take the
//! receiver as a separate parameter instead of inspecting the handler.

use crate::pipeline::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};

/// A captured argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Floats, and integers widened to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(v) => Some(*v),
            ConfigValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "Bool",
            ConfigValue::Int(_) => "Int",
            ConfigValue::Float(_) => "Float",
            ConfigValue::String(_) => "String",
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        ConfigValue::Int(v as i64)
    }
}

impl From<u32> for ConfigValue {
    fn from(v: u32) -> Self {
        ConfigValue::Int(v as i64)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::String(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::String(v)
    }
}

/// Describes one captured argument for collaborators (diagram and block
/// generators). Frame contents are never described.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgDescriptor {
    /// Position for positional arguments.
    pub position: Option<usize>,
    /// Name for keyword arguments.
    pub keyword: Option<String>,
    pub type_name: &'static str,
}

/// Arguments captured when an element is constructed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CapturedArgs {
    positional: Vec<ConfigValue>,
    keyword: Vec<(String, ConfigValue)>,
}

impl CapturedArgs {
    pub fn positional(&self) -> &[ConfigValue] {
        &self.positional
    }

    pub fn keyword(&self, name: &str) -> Option<&ConfigValue> {
        self.keyword
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn keywords(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.keyword.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    /// Resolve a positional-or-keyword parameter. A keyword argument named
    /// `name` wins over the positional argument at `index`.
    pub fn param(&self, index: usize, name: &str) -> Option<&ConfigValue> {
        self.keyword(name).or_else(|| self.positional.get(index))
    }

    pub fn int(&self, index: usize, name: &str) -> PipelineResult<i64> {
        self.typed(index, name, "Int", ConfigValue::as_int)
    }

    /// Like [`int`](Self::int), but a missing parameter yields `default`.
    /// A present parameter of the wrong type is still an error.
    pub fn int_or(&self, index: usize, name: &str, default: i64) -> PipelineResult<i64> {
        match self.param(index, name) {
            None => Ok(default),
            Some(_) => self.int(index, name),
        }
    }

    pub fn float(&self, index: usize, name: &str) -> PipelineResult<f64> {
        self.typed(index, name, "Float", ConfigValue::as_float)
    }

    pub fn bool(&self, index: usize, name: &str) -> PipelineResult<bool> {
        self.typed(index, name, "Bool", ConfigValue::as_bool)
    }

    pub fn str(&self, index: usize, name: &str) -> PipelineResult<&str> {
        match self.param(index, name) {
            Some(value) => value.as_str().ok_or_else(|| mistyped(name, "String", value)),
            None => Err(missing(index, name)),
        }
    }

    fn typed<V>(
        &self,
        index: usize,
        name: &str,
        expected: &str,
        extract: impl Fn(&ConfigValue) -> Option<V>,
    ) -> PipelineResult<V> {
        match self.param(index, name) {
            Some(value) => extract(value).ok_or_else(|| mistyped(name, expected, value)),
            None => Err(missing(index, name)),
        }
    }

    fn describe(&self) -> Vec<ArgDescriptor> {
        let positional = self
            .positional
            .iter()
            .enumerate()
            .map(|(i, value)| ArgDescriptor {
                position: Some(i),
                keyword: None,
                type_name: value.type_name(),
            });
        let keyword = self.keyword.iter().map(|(name, value)| ArgDescriptor {
            position: None,
            keyword: Some(name.clone()),
            type_name: value.type_name(),
        });
        positional.chain(keyword).collect()
    }
}

fn missing(index: usize, name: &str) -> PipelineError {
    PipelineError::Config(format!("missing argument '{}' (position {})", name, index))
}

fn mistyped(name: &str, expected: &str, value: &ConfigValue) -> PipelineError {
    PipelineError::Config(format!(
        "argument '{}' should be {}, got {}",
        name,
        expected,
        value.type_name()
    ))
}

/// Name and captured arguments of an element.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementConfig {
    name: Option<String>,
    args: CapturedArgs,
}

impl ElementConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<ConfigValue>) -> Self {
        self.args.positional.push(value.into());
        self
    }

    /// Set a keyword argument, replacing an earlier one of the same name.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.args.keyword.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.args.keyword.push((name, value)),
        }
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn args(&self) -> &CapturedArgs {
        &self.args
    }

    /// Positional descriptors first, then keyword descriptors in insertion order.
    pub fn describe(&self) -> Vec<ArgDescriptor> {
        self.args.describe()
    }
}

/// A handler together with its element configuration.
///
/// `H` is the handler's storage type, typically a boxed closure. Handler
/// errors are returned exactly as the handler produced them.
pub struct Binder<H> {
    config: ElementConfig,
    handler: H,
}

impl<H> Binder<H> {
    pub fn new(config: ElementConfig, handler: H) -> Self {
        Self { config, handler }
    }

    pub fn config(&self) -> &ElementConfig {
        &self.config
    }

    /// Invoke the handler with a runtime argument ahead of the captured ones.
    pub fn call<In, Out>(&mut self, runtime: In) -> anyhow::Result<Out>
    where
        H: FnMut(In, &CapturedArgs) -> anyhow::Result<Out>,
    {
        (self.handler)(runtime, &self.config.args)
    }

    /// Invoke a handler that takes no runtime argument.
    pub fn call_bare<Out>(&mut self) -> anyhow::Result<Out>
    where
        H: FnMut(&CapturedArgs) -> anyhow::Result<Out>,
    {
        (self.handler)(&self.config.args)
    }
}

impl<H> std::fmt::Debug for Binder<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
