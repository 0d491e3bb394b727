//! Static definition catalog: node types, recipes and resources.
//!
//! Built once through [`CatalogBuilder`], then frozen into an immutable
//! [`Catalog`] that the engine shares by `Arc`. Lookups return `Option`;
//! absence is never an error at this layer.

use crate::fixed::{Fixed64, SimTime};
use crate::id::*;
use std::collections::{BTreeMap, HashMap};

/// Resource key -> quantity. Ordered so iteration is deterministic.
pub type ResourceMap = BTreeMap<ResourceId, Fixed64>;

/// The three kinds of catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Node,
    Recipe,
    Resource,
}

/// A resource type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDef {
    pub key: String,
    /// Display color, passed through to renderers.
    pub color: String,
}

/// A node type (machine template) definition.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTypeDef {
    pub key: String,
    /// Toolbox grouping, passed through to the UI.
    pub category: String,
    /// Manual nodes only start a cycle after an explicit poke.
    pub manual: bool,
    /// Presentation radius. Only used by hit testing.
    pub radius: Fixed64,
    /// Time to complete construction once the build ingredients are in.
    pub build_time: SimTime,
    /// Resources consumed to construct the node.
    pub ingredients: ResourceMap,
    /// Operating capacities once built.
    pub resources: ResourceMap,
    /// Recipes this node type may run.
    pub recipes: Vec<RecipeId>,
}

/// One weighted alternative of a chance recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct ChanceOutcome {
    pub weight: Fixed64,
    pub results: ResourceMap,
}

/// What a recipe produces on completion.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeResults {
    /// The same results every cycle.
    Standard(ResourceMap),
    /// Exactly one outcome per cycle, picked by weight.
    Chance(Vec<ChanceOutcome>),
}

impl Default for RecipeResults {
    fn default() -> Self {
        RecipeResults::Standard(ResourceMap::new())
    }
}

impl RecipeResults {
    /// Whether completing a cycle can produce anything at all.
    pub fn is_empty(&self) -> bool {
        match self {
            RecipeResults::Standard(map) => map.is_empty(),
            RecipeResults::Chance(outcomes) => outcomes.is_empty(),
        }
    }

    /// Largest quantity of `resource` any single completion can produce.
    pub fn max_yield(&self, resource: ResourceId) -> Fixed64 {
        match self {
            RecipeResults::Standard(map) => map.get(&resource).copied().unwrap_or(Fixed64::ZERO),
            RecipeResults::Chance(outcomes) => outcomes
                .iter()
                .filter_map(|o| o.results.get(&resource).copied())
                .max()
                .unwrap_or(Fixed64::ZERO),
        }
    }

    /// Every resource key any outcome mentions.
    pub fn keys(&self) -> Vec<ResourceId> {
        match self {
            RecipeResults::Standard(map) => map.keys().copied().collect(),
            RecipeResults::Chance(outcomes) => {
                let mut keys: Vec<ResourceId> = outcomes
                    .iter()
                    .flat_map(|o| o.results.keys().copied())
                    .collect();
                keys.sort();
                keys.dedup();
                keys
            }
        }
    }
}

/// A recipe definition.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDef {
    pub key: String,
    /// Processing duration of one cycle.
    pub speed: SimTime,
    pub ingredients: ResourceMap,
    /// Capacity overrides while this recipe is selected.
    pub resources: ResourceMap,
    pub results: RecipeResults,
}

impl RecipeDef {
    /// A recipe is runnable when it consumes or produces something.
    pub fn is_valid(&self) -> bool {
        !self.ingredients.is_empty() || !self.results.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for constructing an immutable [`Catalog`].
///
/// Registration order is resources, then recipes, then node types, since
/// later kinds refer to earlier ones by id. Re-registering an existing key
/// replaces its definition and keeps its id.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    resources: Vec<ResourceDef>,
    resource_ids: HashMap<String, ResourceId>,
    recipes: Vec<RecipeDef>,
    recipe_ids: HashMap<String, RecipeId>,
    node_types: Vec<NodeTypeDef>,
    node_type_ids: HashMap<String, NodeTypeId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or update) a resource type.
    pub fn register_resource(&mut self, key: &str, color: &str) -> ResourceId {
        let id = self.resource_id_or_insert(key);
        self.resources[id.0 as usize].color = color.to_string();
        id
    }

    /// Look up a resource id, registering it with the default record if
    /// this is the first time the key is seen.
    pub fn resource_id_or_insert(&mut self, key: &str) -> ResourceId {
        if let Some(id) = self.resource_ids.get(key) {
            return *id;
        }
        let id = ResourceId(self.resources.len() as u32);
        self.resources.push(ResourceDef {
            key: key.to_string(),
            color: DEFAULT_RESOURCE_COLOR.to_string(),
        });
        self.resource_ids.insert(key.to_string(), id);
        id
    }

    /// Build a [`ResourceMap`] from `(key, amount)` pairs, registering
    /// unseen resource keys implicitly.
    pub fn resource_map(&mut self, entries: &[(&str, Fixed64)]) -> ResourceMap {
        entries
            .iter()
            .map(|(key, amount)| (self.resource_id_or_insert(key), *amount))
            .collect()
    }

    /// Register (or replace) a recipe. Returns its id.
    pub fn register_recipe(&mut self, def: RecipeDef) -> RecipeId {
        if let Some(id) = self.recipe_ids.get(&def.key).copied() {
            self.recipes[id.0 as usize] = def;
            return id;
        }
        let id = RecipeId(self.recipes.len() as u32);
        self.recipe_ids.insert(def.key.clone(), id);
        self.recipes.push(def);
        id
    }

    /// Register (or replace) a node type. Returns its id.
    pub fn register_node_type(&mut self, def: NodeTypeDef) -> NodeTypeId {
        if let Some(id) = self.node_type_ids.get(&def.key).copied() {
            self.node_types[id.0 as usize] = def;
            return id;
        }
        let id = NodeTypeId(self.node_types.len() as u32);
        self.node_type_ids.insert(def.key.clone(), id);
        self.node_types.push(def);
        id
    }

    /// Lookup resource id by key.
    pub fn resource_id(&self, key: &str) -> Option<ResourceId> {
        self.resource_ids.get(key).copied()
    }

    /// Lookup recipe id by key.
    pub fn recipe_id(&self, key: &str) -> Option<RecipeId> {
        self.recipe_ids.get(key).copied()
    }

    /// Finalize and build the immutable catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let resource_count = self.resources.len();
        let check_map = |map: &ResourceMap, key: &str, field: &'static str| {
            for (resource, amount) in map {
                if resource.0 as usize >= resource_count {
                    return Err(CatalogError::InvalidResourceRef(*resource));
                }
                if *amount < Fixed64::ZERO {
                    return Err(CatalogError::Negative {
                        key: key.to_string(),
                        field,
                    });
                }
            }
            Ok(())
        };

        for recipe in &self.recipes {
            if recipe.speed < Fixed64::ZERO {
                return Err(CatalogError::Negative {
                    key: recipe.key.clone(),
                    field: "speed",
                });
            }
            check_map(&recipe.ingredients, &recipe.key, "ingredients")?;
            check_map(&recipe.resources, &recipe.key, "resources")?;
            match &recipe.results {
                RecipeResults::Standard(map) => check_map(map, &recipe.key, "results")?,
                RecipeResults::Chance(outcomes) => {
                    let mut total = Fixed64::ZERO;
                    for outcome in outcomes {
                        if outcome.weight < Fixed64::ZERO {
                            return Err(CatalogError::InvalidChanceWeights(recipe.key.clone()));
                        }
                        total = total.saturating_add(outcome.weight);
                        check_map(&outcome.results, &recipe.key, "results")?;
                    }
                    if !outcomes.is_empty() && total <= Fixed64::ZERO {
                        return Err(CatalogError::InvalidChanceWeights(recipe.key.clone()));
                    }
                }
            }
        }

        for node_type in &self.node_types {
            if node_type.build_time < Fixed64::ZERO {
                return Err(CatalogError::Negative {
                    key: node_type.key.clone(),
                    field: "buildtime",
                });
            }
            check_map(&node_type.ingredients, &node_type.key, "ingredients")?;
            check_map(&node_type.resources, &node_type.key, "resources")?;
            for recipe in &node_type.recipes {
                if recipe.0 as usize >= self.recipes.len() {
                    return Err(CatalogError::InvalidRecipeRef(*recipe));
                }
            }
        }

        Ok(Catalog {
            resources: self.resources,
            resource_ids: self.resource_ids,
            recipes: self.recipes,
            recipe_ids: self.recipe_ids,
            node_types: self.node_types,
            node_type_ids: self.node_type_ids,
        })
    }
}

/// Color given to resources that have no explicit definition.
pub const DEFAULT_RESOURCE_COLOR: &str = "black";

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable catalog. Frozen after `build()`. Thread-safe to share.
#[derive(Debug)]
pub struct Catalog {
    resources: Vec<ResourceDef>,
    resource_ids: HashMap<String, ResourceId>,
    recipes: Vec<RecipeDef>,
    recipe_ids: HashMap<String, RecipeId>,
    node_types: Vec<NodeTypeDef>,
    node_type_ids: HashMap<String, NodeTypeId>,
}

impl Catalog {
    pub fn has(&self, kind: DefinitionKind, key: &str) -> bool {
        match kind {
            DefinitionKind::Node => self.node_type_ids.contains_key(key),
            DefinitionKind::Recipe => self.recipe_ids.contains_key(key),
            DefinitionKind::Resource => self.resource_ids.contains_key(key),
        }
    }

    /// Keys of one kind, in registration order.
    pub fn list(&self, kind: DefinitionKind) -> Vec<&str> {
        match kind {
            DefinitionKind::Node => self.node_types.iter().map(|d| d.key.as_str()).collect(),
            DefinitionKind::Recipe => self.recipes.iter().map(|d| d.key.as_str()).collect(),
            DefinitionKind::Resource => self.resources.iter().map(|d| d.key.as_str()).collect(),
        }
    }

    pub fn node_type(&self, id: NodeTypeId) -> Option<&NodeTypeDef> {
        self.node_types.get(id.0 as usize)
    }

    pub fn recipe(&self, id: RecipeId) -> Option<&RecipeDef> {
        self.recipes.get(id.0 as usize)
    }

    pub fn resource(&self, id: ResourceId) -> Option<&ResourceDef> {
        self.resources.get(id.0 as usize)
    }

    pub fn node_type_id(&self, key: &str) -> Option<NodeTypeId> {
        self.node_type_ids.get(key).copied()
    }

    pub fn recipe_id(&self, key: &str) -> Option<RecipeId> {
        self.recipe_ids.get(key).copied()
    }

    pub fn resource_id(&self, key: &str) -> Option<ResourceId> {
        self.resource_ids.get(key).copied()
    }

    pub fn node_type_by_key(&self, key: &str) -> Option<&NodeTypeDef> {
        self.node_type_id(key).and_then(|id| self.node_type(id))
    }

    pub fn recipe_by_key(&self, key: &str) -> Option<&RecipeDef> {
        self.recipe_id(key).and_then(|id| self.recipe(id))
    }

    pub fn resource_by_key(&self, key: &str) -> Option<&ResourceDef> {
        self.resource_id(key).and_then(|id| self.resource(id))
    }

    pub fn node_type_count(&self) -> usize {
        self.node_types.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid resource reference: {0:?}")]
    InvalidResourceRef(ResourceId),
    #[error("invalid recipe reference: {0:?}")]
    InvalidRecipeRef(RecipeId),
    #[error("chance recipe '{0}' needs non-negative weights with a positive sum")]
    InvalidChanceWeights(String),
    #[error("'{key}' has a negative {field}")]
    Negative { key: String, field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fx(v: i32) -> Fixed64 {
        Fixed64::from_num(v)
    }

    fn setup_builder() -> CatalogBuilder {
        let mut b = CatalogBuilder::new();
        b.register_resource("ore", "brown");
        let ingredients = b.resource_map(&[("ore", fx(2))]);
        let results = b.resource_map(&[("iron", fx(1))]);
        let capacities = b.resource_map(&[("ore", fx(10)), ("iron", fx(10))]);
        let smelt = b.register_recipe(RecipeDef {
            key: "smelt".to_string(),
            speed: fx(3),
            ingredients,
            resources: capacities,
            results: RecipeResults::Standard(results),
        });
        let build = b.resource_map(&[("ore", fx(5))]);
        b.register_node_type(NodeTypeDef {
            key: "smelter".to_string(),
            category: "basic".to_string(),
            manual: false,
            radius: fx(30),
            build_time: fx(2),
            ingredients: build,
            resources: ResourceMap::new(),
            recipes: vec![smelt],
        });
        b
    }

    #[test]
    fn register_and_build() {
        let cat = setup_builder().build().unwrap();
        assert_eq!(cat.resource_count(), 2);
        assert_eq!(cat.recipe_count(), 1);
        assert_eq!(cat.node_type_count(), 1);
    }

    #[test]
    fn implicit_resources_get_default_color() {
        let cat = setup_builder().build().unwrap();
        assert_eq!(cat.resource_by_key("ore").unwrap().color, "brown");
        assert_eq!(cat.resource_by_key("iron").unwrap().color, DEFAULT_RESOURCE_COLOR);
    }

    #[test]
    fn explicit_registration_after_implicit_keeps_id() {
        let mut b = CatalogBuilder::new();
        let implicit = b.resource_id_or_insert("coal");
        let explicit = b.register_resource("coal", "grey");
        assert_eq!(implicit, explicit);
        let cat = b.build().unwrap();
        assert_eq!(cat.resource(implicit).unwrap().color, "grey");
    }

    #[test]
    fn has_and_list_by_kind() {
        let cat = setup_builder().build().unwrap();
        assert!(cat.has(DefinitionKind::Node, "smelter"));
        assert!(cat.has(DefinitionKind::Recipe, "smelt"));
        assert!(cat.has(DefinitionKind::Resource, "iron"));
        assert!(!cat.has(DefinitionKind::Node, "smelt"));
        assert_eq!(cat.list(DefinitionKind::Resource), vec!["ore", "iron"]);
    }

    #[test]
    fn missing_lookups_return_none() {
        let cat = setup_builder().build().unwrap();
        assert!(cat.node_type_by_key("nope").is_none());
        assert!(cat.recipe(RecipeId(99)).is_none());
        assert!(cat.resource(ResourceId(99)).is_none());
    }

    #[test]
    fn invalid_recipe_ref_fails() {
        let mut b = CatalogBuilder::new();
        b.register_node_type(NodeTypeDef {
            key: "broken".to_string(),
            category: "basic".to_string(),
            manual: false,
            radius: fx(30),
            build_time: fx(0),
            ingredients: ResourceMap::new(),
            resources: ResourceMap::new(),
            recipes: vec![RecipeId(7)],
        });
        assert!(matches!(b.build(), Err(CatalogError::InvalidRecipeRef(RecipeId(7)))));
    }

    #[test]
    fn chance_weights_must_have_positive_sum() {
        let mut b = CatalogBuilder::new();
        let a = b.resource_map(&[("gem", fx(1))]);
        b.register_recipe(RecipeDef {
            key: "sift".to_string(),
            speed: fx(1),
            ingredients: ResourceMap::new(),
            resources: ResourceMap::new(),
            results: RecipeResults::Chance(vec![ChanceOutcome {
                weight: Fixed64::ZERO,
                results: a,
            }]),
        });
        let err = b.build().unwrap_err();
        assert!(err.to_string().contains("sift"), "got: {err}");
    }

    #[test]
    fn negative_speed_rejected() {
        let mut b = CatalogBuilder::new();
        b.register_recipe(RecipeDef {
            key: "backwards".to_string(),
            speed: fx(-1),
            ingredients: ResourceMap::new(),
            resources: ResourceMap::new(),
            results: RecipeResults::default(),
        });
        assert!(matches!(b.build(), Err(CatalogError::Negative { field: "speed", .. })));
    }

    #[test]
    fn max_yield_across_chance_outcomes() {
        let gem = ResourceId(0);
        let results = RecipeResults::Chance(vec![
            ChanceOutcome {
                weight: fx(1),
                results: [(gem, fx(2))].into_iter().collect(),
            },
            ChanceOutcome {
                weight: fx(1),
                results: [(gem, fx(5))].into_iter().collect(),
            },
        ]);
        assert_eq!(results.max_yield(gem), fx(5));
        assert_eq!(results.max_yield(ResourceId(1)), Fixed64::ZERO);
        assert_eq!(results.keys(), vec![gem]);
    }

    #[test]
    fn recipe_validity() {
        let empty = RecipeDef {
            key: "noop".to_string(),
            speed: fx(1),
            ingredients: ResourceMap::new(),
            resources: ResourceMap::new(),
            results: RecipeResults::default(),
        };
        assert!(!empty.is_valid());
        let sink = RecipeDef {
            ingredients: [(ResourceId(0), fx(1))].into_iter().collect(),
            ..empty
        };
        assert!(sink.is_valid());
    }
}
