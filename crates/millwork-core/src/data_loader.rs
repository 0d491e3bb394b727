//! Data-driven catalog loading from JSON.
//!
//! Feature-gated behind `data-loader`. Definitions are keyed mappings of
//! partial records; absent fields take the per-kind defaults below. The
//! schema structs are public so other front ends (RON, TOML) can reuse them
//! and hand the result to [`build_catalog`].

use crate::catalog::{
    Catalog, CatalogBuilder, CatalogError, ChanceOutcome, NodeTypeDef, RecipeDef, RecipeResults,
    ResourceMap,
};
use crate::fixed::f64_to_fixed64;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("node type '{node}' lists unknown recipe '{recipe}'")]
    UnknownRecipeRef { node: String, recipe: String },
    #[error("recipe '{recipe}' has {outcomes} outcomes but {chances} chances")]
    ChanceMismatch {
        recipe: String,
        outcomes: usize,
        chances: usize,
    },
}

// ---------------------------------------------------------------------------
// Document schema
// ---------------------------------------------------------------------------

/// Resource key to quantity, in source order.
pub type AmountMap = IndexMap<String, f64>;

/// Top-level catalog document: `{ "nodes": {..}, "recipes": {..}, "resources": {..} }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub resources: IndexMap<String, ResourceData>,
    #[serde(default)]
    pub recipes: IndexMap<String, RecipeData>,
    #[serde(default)]
    pub nodes: IndexMap<String, NodeTypeData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceData {
    pub color: String,
}

impl Default for ResourceData {
    fn default() -> Self {
        Self {
            color: crate::catalog::DEFAULT_RESOURCE_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeData {
    pub speed: f64,
    pub ingredients: AmountMap,
    /// Capacity overrides applied while this recipe is selected.
    pub resources: AmountMap,
    pub results: Option<ResultsData>,
    /// One weight per outcome when `results` is a list.
    pub chances: Vec<f64>,
}

/// `results` is an object for a standard recipe, or a list of objects for
/// a chance recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultsData {
    Standard(AmountMap),
    Chance(Vec<AmountMap>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeTypeData {
    pub category: String,
    pub manual: bool,
    pub radius: f64,
    /// Build cost paid while a ghost.
    pub ingredients: AmountMap,
    #[serde(alias = "build_time")]
    pub buildtime: f64,
    /// Base capacities.
    pub resources: AmountMap,
    pub recipes: Vec<String>,
}

impl Default for NodeTypeData {
    fn default() -> Self {
        Self {
            category: "basic".to_string(),
            manual: false,
            radius: 30.0,
            ingredients: AmountMap::new(),
            buildtime: 0.0,
            resources: AmountMap::new(),
            recipes: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading functions
// ---------------------------------------------------------------------------

pub fn load_catalog_json(json: &str) -> Result<Catalog, DataLoadError> {
    let data: CatalogData = serde_json::from_str(json)?;
    build_catalog(data)
}

pub fn load_catalog_json_bytes(bytes: &[u8]) -> Result<Catalog, DataLoadError> {
    let data: CatalogData = serde_json::from_slice(bytes)?;
    build_catalog(data)
}

/// Resolve keys, apply defaults and validate into a frozen [`Catalog`].
pub fn build_catalog(data: CatalogData) -> Result<Catalog, DataLoadError> {
    let mut builder = CatalogBuilder::new();

    for (key, resource) in &data.resources {
        builder.register_resource(key, &resource.color);
    }

    for (key, recipe) in &data.recipes {
        let results = match &recipe.results {
            None => RecipeResults::default(),
            Some(ResultsData::Standard(map)) => {
                RecipeResults::Standard(to_resource_map(&mut builder, map))
            }
            Some(ResultsData::Chance(outcomes)) => {
                if outcomes.len() != recipe.chances.len() {
                    return Err(DataLoadError::ChanceMismatch {
                        recipe: key.clone(),
                        outcomes: outcomes.len(),
                        chances: recipe.chances.len(),
                    });
                }
                RecipeResults::Chance(
                    outcomes
                        .iter()
                        .zip(&recipe.chances)
                        .map(|(map, weight)| ChanceOutcome {
                            weight: f64_to_fixed64(*weight),
                            results: to_resource_map(&mut builder, map),
                        })
                        .collect(),
                )
            }
        };
        let def = RecipeDef {
            key: key.clone(),
            speed: f64_to_fixed64(recipe.speed),
            ingredients: to_resource_map(&mut builder, &recipe.ingredients),
            resources: to_resource_map(&mut builder, &recipe.resources),
            results,
        };
        builder.register_recipe(def);
    }

    for (key, node) in &data.nodes {
        let recipes = node
            .recipes
            .iter()
            .map(|recipe| {
                builder
                    .recipe_id(recipe)
                    .ok_or_else(|| DataLoadError::UnknownRecipeRef {
                        node: key.clone(),
                        recipe: recipe.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let def = NodeTypeDef {
            key: key.clone(),
            category: node.category.clone(),
            manual: node.manual,
            radius: f64_to_fixed64(node.radius),
            build_time: f64_to_fixed64(node.buildtime),
            ingredients: to_resource_map(&mut builder, &node.ingredients),
            resources: to_resource_map(&mut builder, &node.resources),
            recipes,
        };
        builder.register_node_type(def);
    }

    Ok(builder.build()?)
}

fn to_resource_map(builder: &mut CatalogBuilder, amounts: &AmountMap) -> ResourceMap {
    let entries: Vec<(&str, _)> = amounts
        .iter()
        .map(|(key, value)| (key.as_str(), f64_to_fixed64(*value)))
        .collect();
    builder.resource_map(&entries)
}
