use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use nav_core::{BbKey, Blackboard, BlackboardError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("node `{node}` is missing required port `{port}`")]
    Missing { node: String, port: String },

    #[error("node `{node}` port `{port}`: cannot parse `{value}`: {reason}")]
    Parse {
        node: String,
        port: String,
        value: String,
        reason: String,
    },

    #[error("blackboard entry `{key}` is not set")]
    Unset { key: String },

    #[error(transparent)]
    Blackboard(#[from] BlackboardError),
}

/// Instance name and raw port strings of one node in a tree description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeConfig {
    pub name: String,
    pub ports: BTreeMap<String, String>,
}

impl NodeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ports: BTreeMap::new(),
        }
    }

    pub fn with_port(mut self, port: impl Into<String>, value: impl Into<String>) -> Self {
        self.ports.insert(port.into(), value.into());
        self
    }

    pub fn raw(&self, port: &str) -> Option<&str> {
        self.ports.get(port).map(String::as_str)
    }

    /// Interpret `port` as a literal or a `{key}` blackboard remap.
    pub fn input<T>(&self, port: &str) -> Result<PortValue<T>, PortError>
    where
        T: FromStr + 'static,
        T::Err: Display,
    {
        let raw = self.raw(port).ok_or_else(|| PortError::Missing {
            node: self.name.clone(),
            port: port.to_owned(),
        })?;
        PortValue::parse(raw).map_err(|reason| PortError::Parse {
            node: self.name.clone(),
            port: port.to_owned(),
            value: raw.to_owned(),
            reason,
        })
    }

    /// Like [`input`](Self::input), falling back to `default` when the port
    /// is absent.
    pub fn input_or<T>(&self, port: &str, default: PortValue<T>) -> Result<PortValue<T>, PortError>
    where
        T: FromStr + 'static,
        T::Err: Display,
    {
        if self.raw(port).is_none() {
            return Ok(default);
        }
        self.input(port)
    }

    /// Blackboard key an output port writes to. Outputs must be remaps.
    pub fn output<T: 'static>(&self, port: &str) -> Result<BbKey<T>, PortError> {
        let raw = self.raw(port).ok_or_else(|| PortError::Missing {
            node: self.name.clone(),
            port: port.to_owned(),
        })?;
        remap_key(raw).map(BbKey::owned).ok_or_else(|| PortError::Parse {
            node: self.name.clone(),
            port: port.to_owned(),
            value: raw.to_owned(),
            reason: "output ports must reference a blackboard entry as `{key}`".to_owned(),
        })
    }
}

/// Port value: either fixed in the tree description or read from the
/// blackboard on every tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortValue<T: 'static> {
    Literal(T),
    Remap(BbKey<T>),
}

impl<T> PortValue<T>
where
    T: 'static,
{
    pub const fn remap(key: &'static str) -> Self {
        PortValue::Remap(BbKey::new(key))
    }

    pub fn parse(raw: &str) -> Result<Self, String>
    where
        T: FromStr,
        T::Err: Display,
    {
        if let Some(key) = remap_key(raw) {
            return Ok(PortValue::Remap(BbKey::owned(key)));
        }
        raw.trim()
            .parse::<T>()
            .map(PortValue::Literal)
            .map_err(|e| e.to_string())
    }

    pub fn resolve(&self, blackboard: &Blackboard) -> Result<T, PortError>
    where
        T: Clone,
    {
        match self {
            PortValue::Literal(value) => Ok(value.clone()),
            PortValue::Remap(key) => blackboard.get(key)?.cloned().ok_or_else(|| {
                PortError::Unset {
                    key: key.name().to_owned(),
                }
            }),
        }
    }
}

fn remap_key(raw: &str) -> Option<&str> {
    let key = raw.trim().strip_prefix('{')?.strip_suffix('}')?.trim();
    (!key.is_empty()).then_some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_and_remaps() {
        let config = NodeConfig::new("back_up")
            .with_port("backup_dist", "0.3")
            .with_port("backup_speed", "{speed}")
            .with_port("error_code_id", "{error_code}");

        assert_eq!(
            config.input::<f64>("backup_dist").unwrap(),
            PortValue::Literal(0.3)
        );

        let speed = config.input::<f64>("backup_speed").unwrap();
        let mut bb = Blackboard::new();
        assert_eq!(
            speed.resolve(&bb),
            Err(PortError::Unset {
                key: "speed".to_owned()
            })
        );
        bb.set(&BbKey::new("speed"), 0.05f64);
        assert_eq!(speed.resolve(&bb), Ok(0.05));

        assert_eq!(
            config.output::<u16>("error_code_id").unwrap().name(),
            "error_code"
        );
        assert!(config.output::<u16>("backup_dist").is_err());
    }

    #[test]
    fn missing_and_unparsable_ports() {
        let config = NodeConfig::new("n").with_port("flag", "maybe");
        assert!(matches!(
            config.input::<bool>("absent"),
            Err(PortError::Missing { .. })
        ));
        assert!(matches!(
            config.input::<bool>("flag"),
            Err(PortError::Parse { .. })
        ));
        assert_eq!(
            config
                .input_or::<bool>("absent", PortValue::Literal(true))
                .unwrap(),
            PortValue::Literal(true)
        );
    }
}
