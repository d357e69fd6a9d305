//! JSON-serializable run statistics, shaped for the `--stats` driver flag.
//!
//! Field names are renamed to match the documented external record exactly
//! (`nTotalVisits`, `maxObservedCostPerMemoizedVertex`, ...) while the Rust
//! struct fields stay snake_case.

use serde::Serialize;

use crate::backtrack::SearchStats;
use crate::compile::Program;

#[derive(Debug, Serialize)]
pub struct InputInfo {
    #[serde(rename = "nStates")]
    pub n_states: usize,
    #[serde(rename = "lenW")]
    pub len_w: usize,
}

#[derive(Debug, Serialize)]
pub struct SimulationInfo {
    #[serde(rename = "nTotalVisits")]
    pub n_total_visits: u64,
    #[serde(rename = "nPossibleTotalVisitsWithMemoization")]
    pub n_possible_total_visits_with_memoization: u64,
    #[serde(rename = "visitsToMostVisitedSearchState")]
    pub visits_to_most_visited_search_state: u64,
    #[serde(rename = "visitsToMostVisitedVertex")]
    pub visits_to_most_visited_vertex: u64,
}

#[derive(Debug, Serialize)]
pub struct MemoizationConfig {
    #[serde(rename = "vertexSelection")]
    pub vertex_selection: String,
    pub encoding: String,
}

#[derive(Debug, Serialize)]
pub struct MemoizationResults {
    #[serde(rename = "nSelectedVertices")]
    pub n_selected_vertices: usize,
    #[serde(rename = "lenW")]
    pub len_w: usize,
    #[serde(rename = "maxObservedCostPerMemoizedVertex")]
    pub max_observed_cost_per_memoized_vertex: Vec<u64>,
}

#[derive(Debug, Serialize)]
pub struct MemoizationInfo {
    pub config: MemoizationConfig,
    pub results: MemoizationResults,
}

#[derive(Debug, Serialize)]
pub struct RunStats {
    #[serde(rename = "inputInfo")]
    pub input_info: InputInfo,
    #[serde(rename = "simulationInfo")]
    pub simulation_info: SimulationInfo,
    #[serde(rename = "memoizationInfo")]
    pub memoization_info: MemoizationInfo,
}

impl RunStats {
    pub fn build(prog: &Program, input_len: usize, stats: &SearchStats) -> RunStats {
        let len_w = input_len + 1;
        RunStats {
            input_info: InputInfo { n_states: prog.len(), len_w },
            simulation_info: SimulationInfo {
                n_total_visits: stats.n_total_visits,
                n_possible_total_visits_with_memoization: prog.n_memoized_states as u64 * len_w as u64,
                visits_to_most_visited_search_state: stats.visits_to_most_visited_search_state,
                visits_to_most_visited_vertex: stats.visits_to_most_visited_vertex,
            },
            memoization_info: MemoizationInfo {
                config: MemoizationConfig {
                    vertex_selection: prog.memo_mode.name().to_string(),
                    encoding: prog.memo_encoding.name().to_string(),
                },
                results: MemoizationResults {
                    n_selected_vertices: prog.n_memoized_states,
                    len_w,
                    max_observed_cost_per_memoized_vertex: stats.max_observed_cost_per_memoized_vertex.clone(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::backtrack;
    use crate::memo::{MemoEncoding, MemoMode};
    use crate::parse::parse;
    use crate::transform::transform;

    #[test]
    fn emits_documented_field_names() {
        let ast = transform(parse("(a+)+b").unwrap());
        let prog =
            crate::compile::compile(&ast, MemoMode::InDegGt1, MemoEncoding::Rle, NonZeroUsize::new(1).unwrap())
                .unwrap();
        let input = "a".repeat(16);
        let result = backtrack::search(&prog, input.as_bytes(), 0, backtrack::DEFAULT_MAX_STACK).unwrap();
        let run_stats = RunStats::build(&prog, input.len(), &result.stats);
        let json = serde_json::to_value(&run_stats).unwrap();

        assert!(json["inputInfo"]["nStates"].is_u64());
        assert!(json["inputInfo"]["lenW"].is_u64());
        assert!(json["simulationInfo"]["nTotalVisits"].is_u64());
        assert!(json["simulationInfo"]["nPossibleTotalVisitsWithMemoization"].is_u64());
        assert!(json["simulationInfo"]["visitsToMostVisitedSearchState"].is_u64());
        assert!(json["simulationInfo"]["visitsToMostVisitedVertex"].is_u64());
        assert!(json["memoizationInfo"]["config"]["vertexSelection"].is_string());
        assert!(json["memoizationInfo"]["config"]["encoding"].is_string());
        assert!(json["memoizationInfo"]["results"]["nSelectedVertices"].is_u64());
        assert!(json["memoizationInfo"]["results"]["lenW"].is_u64());
        assert!(json["memoizationInfo"]["results"]["maxObservedCostPerMemoizedVertex"].is_array());
    }

    #[test]
    fn n_possible_total_visits_matches_n_states_times_len_plus_one() {
        let ast = transform(parse("(a|a)*b").unwrap());
        let prog =
            crate::compile::compile(&ast, MemoMode::Full, MemoEncoding::Negative, NonZeroUsize::new(1).unwrap())
                .unwrap();
        let input = "a".repeat(10);
        let result = backtrack::search(&prog, input.as_bytes(), 0, backtrack::DEFAULT_MAX_STACK).unwrap();
        let run_stats = RunStats::build(&prog, input.len(), &result.stats);
        assert_eq!(
            run_stats.simulation_info.n_possible_total_visits_with_memoization,
            prog.n_memoized_states as u64 * (input.len() as u64 + 1)
        );
    }
}
