use std::collections::BTreeMap;

use nav_core::{ActionKey, ActionProvider, ActionRuntime, BbKey, Blackboard, ErrorCode};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::action::{ActionNode, CancelNode};
use crate::bt::BtNode;
use crate::conditions::{would_a_route_recovery_help_node, AreErrorCodesPresent, ERROR_CODE};
use crate::nodes::{ReactiveSelector, ReactiveSequence, Selector, Sequence};
use crate::ports::{NodeConfig, PortError};
use crate::tree::BehaviorTree;

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("no node is registered for tag `{0}`")]
    UnknownTag(String),

    #[error("`{tag}` expects {expected} children, found {found}")]
    Children {
        tag: String,
        expected: &'static str,
        found: usize,
    },

    #[error(transparent)]
    Port(#[from] PortError),

    #[error("invalid tree description: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Declarative tree description, typically loaded from YAML:
///
/// ```yaml
/// tag: ReactiveFallback
/// children:
///   - tag: WouldARouteRecoveryHelp
///     ports: { error_code: "{error_code}" }
///   - tag: BackUp
///     ports: { backup_dist: 0.3, backup_speed: 0.05 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub tag: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "ports_as_strings")]
    pub ports: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<TreeSpec>,
}

impl TreeSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            name: None,
            ports: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, FactoryError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn with_port(mut self, port: impl Into<String>, value: impl Into<String>) -> Self {
        self.ports.insert(port.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: TreeSpec) -> Self {
        self.children.push(child);
        self
    }

    fn node_config(&self) -> NodeConfig {
        NodeConfig {
            name: self.name.clone().unwrap_or_else(|| self.tag.clone()),
            ports: self.ports.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPort {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

fn ports_as_strings<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, RawPort>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(port, value)| {
            let value = match value {
                RawPort::Bool(b) => b.to_string(),
                RawPort::Int(i) => i.to_string(),
                RawPort::Float(f) => f.to_string(),
                RawPort::Text(s) => s,
            };
            (port, value)
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    Leaf,
    Composite,
}

type Builder =
    Box<dyn Fn(&NodeConfig, Vec<Box<dyn BtNode>>) -> Result<Box<dyn BtNode>, FactoryError>>;

struct Registration {
    arity: Arity,
    builder: Builder,
}

/// Registry mapping tree-description tags to node constructors.
///
/// Tags are the compatibility contract with tree authors; a cancel node is
/// registered as `Cancel<ActionTag>` next to its action node.
#[derive(Default)]
pub struct BehaviorTreeFactory {
    registrations: BTreeMap<String, Registration>,
}

impl BehaviorTreeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with the control nodes and recovery-advisory conditions.
    pub fn with_builtin_nodes() -> Self {
        let mut factory = Self::new();

        factory.register_control("Sequence", |children| Box::new(Sequence::new(children)));
        factory.register_control("Fallback", |children| Box::new(Selector::new(children)));
        factory.register_control("ReactiveSequence", |children| {
            Box::new(ReactiveSequence::new(children))
        });
        factory.register_control("ReactiveFallback", |children| {
            Box::new(ReactiveSelector::new(children))
        });

        factory.register_leaf("WouldARouteRecoveryHelp", |config| {
            let key = error_code_input(config)?;
            Ok(Box::new(would_a_route_recovery_help_node(config.name.clone(), key)))
        });
        factory.register_leaf("AreErrorCodesPresent", |config| {
            let key = error_code_input(config)?;
            let codes = parse_error_codes(config)?;
            Ok(Box::new(AreErrorCodesPresent::new(config.name.clone(), key, codes)))
        });

        factory
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.registrations.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.registrations.keys().map(String::as_str)
    }

    /// Register a node without children. Replaces any previous registration.
    pub fn register_leaf<F>(&mut self, tag: impl Into<String>, build: F)
    where
        F: Fn(&NodeConfig) -> Result<Box<dyn BtNode>, PortError> + 'static,
    {
        self.registrations.insert(
            tag.into(),
            Registration {
                arity: Arity::Leaf,
                builder: Box::new(
                    move |config: &NodeConfig,
                          _children: Vec<Box<dyn BtNode>>|
                          -> Result<Box<dyn BtNode>, FactoryError> { Ok(build(config)?) },
                ),
            },
        );
    }

    /// Register a control node taking one or more children.
    pub fn register_control<F>(&mut self, tag: impl Into<String>, build: F)
    where
        F: Fn(Vec<Box<dyn BtNode>>) -> Box<dyn BtNode> + 'static,
    {
        self.registrations.insert(
            tag.into(),
            Registration {
                arity: Arity::Composite,
                builder: Box::new(
                    move |_config: &NodeConfig,
                          children: Vec<Box<dyn BtNode>>|
                          -> Result<Box<dyn BtNode>, FactoryError> { Ok(build(children)) },
                ),
            },
        );
    }

    /// Register an action-invocation node for the adapter under `key`.
    ///
    /// `goal_from_ports` turns the node's ports into a goal builder that runs
    /// each time a new goal is started. An `error_code_id` port, when
    /// present, names the blackboard entry receiving the terminal error code.
    pub fn register_action<P, G, B>(
        &mut self,
        tag: impl Into<String>,
        key: ActionKey,
        goal_from_ports: B,
    ) where
        P: ActionProvider,
        G: FnMut(&Blackboard) -> Result<P::Goal, PortError> + 'static,
        B: Fn(&NodeConfig) -> Result<G, PortError> + 'static,
    {
        self.register_leaf(tag, move |config| {
            let goal_fn = goal_from_ports(config)?;
            let mut node = ActionNode::<P>::new(config.name.clone(), key, goal_fn);
            if config.raw("error_code_id").is_some() {
                let output: BbKey<ErrorCode> = config.output("error_code_id")?;
                node = node.with_error_code_output(output);
            }
            Ok(Box::new(node))
        });
    }

    /// Register a cancel node for the adapter under `key`.
    pub fn register_cancel(&mut self, tag: impl Into<String>, key: ActionKey) {
        self.register_leaf(tag, move |config| {
            Ok(Box::new(CancelNode::new(config.name.clone(), key)))
        });
    }

    pub fn build(&self, spec: &TreeSpec) -> Result<Box<dyn BtNode>, FactoryError> {
        let registration = self
            .registrations
            .get(&spec.tag)
            .ok_or_else(|| FactoryError::UnknownTag(spec.tag.clone()))?;

        match (registration.arity, spec.children.len()) {
            (Arity::Leaf, 0) => {}
            (Arity::Leaf, found) => {
                return Err(FactoryError::Children {
                    tag: spec.tag.clone(),
                    expected: "no",
                    found,
                })
            }
            (Arity::Composite, 0) => {
                return Err(FactoryError::Children {
                    tag: spec.tag.clone(),
                    expected: "at least one",
                    found: 0,
                })
            }
            (Arity::Composite, _) => {}
        }

        let children = spec
            .children
            .iter()
            .map(|child| self.build(child))
            .collect::<Result<Vec<_>, _>>()?;
        (registration.builder)(&spec.node_config(), children)
    }

    pub fn build_from_yaml(&self, yaml: &str) -> Result<Box<dyn BtNode>, FactoryError> {
        self.build(&TreeSpec::from_yaml_str(yaml)?)
    }

    pub fn create_tree(
        &self,
        spec: &TreeSpec,
        blackboard: Blackboard,
        actions: ActionRuntime,
    ) -> Result<BehaviorTree, FactoryError> {
        let root = self.build(spec)?;
        Ok(BehaviorTree::new(root, blackboard, actions))
    }
}

fn error_code_input(config: &NodeConfig) -> Result<BbKey<ErrorCode>, PortError> {
    if config.raw("error_code").is_none() {
        return Ok(ERROR_CODE);
    }
    config.output("error_code")
}

/// `error_codes_to_check`: comma separated names or numbers.
fn parse_error_codes(config: &NodeConfig) -> Result<Vec<ErrorCode>, PortError> {
    let raw = config.raw("error_codes_to_check").ok_or_else(|| PortError::Missing {
        node: config.name.clone(),
        port: "error_codes_to_check".to_owned(),
    })?;
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<ErrorCode>().map_err(|e| PortError::Parse {
                node: config.name.clone(),
                port: "error_codes_to_check".to_owned(),
                value: raw.to_owned(),
                reason: e.to_string(),
            })
        })
        .collect()
}
