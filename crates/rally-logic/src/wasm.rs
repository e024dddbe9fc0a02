//! WASM bindings for the browser UI

#![cfg(feature = "wasm")]

use std::sync::Arc;

use wasm_bindgen::prelude::*;

use crate::{action_catalog, build_outcome_table, simulate_match, ChoiceSlot, Match, MatchConfig};

fn parse_seed(seed: Option<Vec<u8>>) -> Result<[u8; 32], JsError> {
    match seed {
        Some(bytes) => bytes
            .as_slice()
            .try_into()
            .map_err(|_| JsError::new("Seed must be exactly 32 bytes")),
        None => {
            let mut seed = [0u8; 32];
            for byte in seed.iter_mut() {
                *byte = (js_sys::Math::random() * 256.0) as u8;
            }
            Ok(seed)
        }
    }
}

fn parse_config(config_json: Option<String>) -> Result<MatchConfig, JsError> {
    match config_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| JsError::new(&format!("Invalid config: {}", e))),
        None => Ok(MatchConfig::standard()),
    }
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Interactive match driven one choice at a time
#[wasm_bindgen]
pub struct WasmMatch {
    inner: Match,
}

#[wasm_bindgen]
impl WasmMatch {
    /// # Arguments
    /// * `seed` - optional 32-byte seed; random when omitted
    /// * `config_json` - optional JSON MatchConfig; standard rules when omitted
    #[wasm_bindgen(constructor)]
    pub fn new(
        name1: &str,
        name2: &str,
        seed: Option<Vec<u8>>,
        config_json: Option<String>,
    ) -> Result<WasmMatch, JsError> {
        let seed = parse_seed(seed)?;
        let config = parse_config(config_json)?;
        let inner = Match::with_config(
            name1,
            name2,
            Arc::new(build_outcome_table()),
            config,
            &seed,
            0,
        )
        .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(WasmMatch { inner })
    }

    /// Returns `[defender, attacker]`
    #[wasm_bindgen(js_name = coinToss)]
    pub fn coin_toss(&mut self) -> Result<JsValue, JsError> {
        let roles = self.inner.coin_toss().map_err(|e| JsError::new(&e.to_string()))?;
        to_js(&roles)
    }

    /// Returns the rally result after `defense2`, `undefined` otherwise
    #[wasm_bindgen(js_name = submitChoice)]
    pub fn submit_choice(&mut self, slot: &str, index: usize) -> Result<JsValue, JsError> {
        let slot: ChoiceSlot = slot
            .parse()
            .map_err(|e: crate::RallyError| JsError::new(&e.to_string()))?;
        match self.inner.submit_choice(slot, index) {
            Ok(Some(result)) => to_js(&result),
            Ok(None) => Ok(JsValue::UNDEFINED),
            Err(e) => Err(JsError::new(&e.to_string())),
        }
    }

    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    #[wasm_bindgen(js_name = currentScore)]
    pub fn current_score(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.current_score())
    }

    #[wasm_bindgen(js_name = pendingSlots)]
    pub fn pending_slots(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.pending_slots())
    }

    pub fn winner(&self) -> Option<String> {
        self.inner.winner().map(str::to_string)
    }
}

/// Attack, block and defense catalogs as `{index, name}` lists
#[wasm_bindgen]
pub fn get_action_catalog() -> Result<JsValue, JsError> {
    to_js(&action_catalog())
}

/// Every outcome table entry as `{attack, block, slot, defense, chance}`
#[wasm_bindgen]
pub fn get_outcome_table() -> Result<JsValue, JsError> {
    to_js(&build_outcome_table().entries())
}

/// Play a full match with random choices on both sides
///
/// Returns a JSON serialized MatchSummary
#[wasm_bindgen]
pub fn simulate_random_match(
    name1: &str,
    name2: &str,
    seed: &[u8],
    match_index: u32,
    config_json: Option<String>,
) -> Result<JsValue, JsError> {
    let seed = parse_seed(Some(seed.to_vec()))?;
    let config = parse_config(config_json)?;
    let summary = simulate_match(
        Arc::new(build_outcome_table()),
        config,
        (name1, name2),
        &seed,
        match_index,
    )
    .map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&summary)
}
