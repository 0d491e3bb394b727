#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use millwork_core::fixed::Fixed64;
use millwork_core::id::NodeId;
use millwork_core::test_utils::*;

const NODE_TYPES: [&str; 6] = ["smelter", "miner", "quarry", "sifter", "crate", "workshop"];

/// A structured engine command for fuzzing.
#[derive(Arbitrary, Debug)]
enum FuzzOp {
    AddNode { kind: u8, built: bool },
    DeleteNode { index: u8 },
    Connect { from: u8, to: u8 },
    ToggleInput { node: u8, other: u8 },
    ClearOutputs { index: u8 },
    SetRecipe { index: u8, recipe: u8 },
    SetOre { index: u8, amount: i16 },
    Poke { index: u8 },
    Step,
    Advance { dt: i16 },
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    ops: Vec<FuzzOp>,
}

fn pick(ids: &[NodeId], index: u8) -> Option<NodeId> {
    (!ids.is_empty()).then(|| ids[index as usize % ids.len()])
}

fuzz_target!(|input: FuzzInput| {
    let mut engine = test_engine();
    let ore = resource(&engine, "ore");
    let recipes = ["smelt", "dig", "hand_dig", "sift", "bogus"];
    let mut ids: Vec<NodeId> = Vec::new();

    // Limit operations to prevent timeouts.
    let max_ops = input.ops.len().min(200);

    for op in &input.ops[..max_ops] {
        match *op {
            FuzzOp::AddNode { kind, built } => {
                let key = NODE_TYPES[kind as usize % NODE_TYPES.len()];
                let id = if built {
                    place_built(&mut engine, key)
                } else {
                    engine.add_node(key, 0.0, 0.0).unwrap()
                };
                ids.push(id);
            }
            FuzzOp::DeleteNode { index } => {
                if let Some(id) = pick(&ids, index) {
                    engine.delete_node(id).unwrap();
                    ids.retain(|n| *n != id);
                }
            }
            FuzzOp::Connect { from, to } => {
                if let (Some(a), Some(b)) = (pick(&ids, from), pick(&ids, to)) {
                    let _ = engine.connect(a, b);
                }
            }
            FuzzOp::ToggleInput { node, other } => {
                if let (Some(a), Some(b)) = (pick(&ids, node), pick(&ids, other)) {
                    let _ = engine.toggle_input(a, b);
                }
            }
            FuzzOp::ClearOutputs { index } => {
                if let Some(id) = pick(&ids, index) {
                    engine.clear_outputs(id).unwrap();
                }
            }
            FuzzOp::SetRecipe { index, recipe } => {
                if let Some(id) = pick(&ids, index) {
                    let key = recipes[recipe as usize % recipes.len()];
                    let _ = engine.set_recipe(id, Some(key));
                }
            }
            FuzzOp::SetOre { index, amount } => {
                if let Some(id) = pick(&ids, index) {
                    let _ = engine.set_amount(id, ore, Fixed64::from_num(amount));
                }
            }
            FuzzOp::Poke { index } => {
                if let Some(id) = pick(&ids, index) {
                    let _ = engine.poke(id);
                }
            }
            FuzzOp::Step => {
                engine.step();
            }
            FuzzOp::Advance { dt } => {
                engine.advance(Fixed64::from_num(dt));
            }
        }
    }

    assert!(engine.graph().is_consistent());
});
