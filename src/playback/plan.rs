use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::Serialize;

use crate::discovery::models::MediaPresence;
use crate::playback::sequencer::{
    Effect, Event, Phase, PlaybackSequencer, SequencerState, BLOCKED_ERROR_NAMES,
};

#[derive(Debug, Clone, Serialize)]
pub struct PlanNode {
    pub phase: Phase,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanEdge {
    pub to: usize,
    pub effects: Vec<Effect>,
}

/// The sequencer's reachable transition graph for one media combination,
/// flattened so the page script can follow it without any logic of its own.
///
/// `edges[node][event_key]` gives the next node and the effects to run.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackPlan {
    pub initial: usize,
    pub nodes: Vec<PlanNode>,
    pub edges: Vec<BTreeMap<String, PlanEdge>>,
    pub blocked_errors: &'static [&'static str],
}

impl PlaybackPlan {
    pub fn for_media(media: MediaPresence) -> Self {
        let alphabet = Event::alphabet();
        let initial = SequencerState::initial();

        let mut index = HashMap::from([(initial, 0usize)]);
        let mut states = vec![initial];
        let mut edges = vec![BTreeMap::new()];
        let mut queue = VecDeque::from([0usize]);

        while let Some(node) = queue.pop_front() {
            let from = states[node];
            for event in &alphabet {
                let mut sequencer = PlaybackSequencer::resume(media, from);
                let effects = sequencer.handle(event);
                let next = sequencer.state();
                if effects.is_empty() && next == from {
                    continue;
                }

                let to = match index.get(&next) {
                    Some(&to) => to,
                    None => {
                        let to = states.len();
                        index.insert(next, to);
                        states.push(next);
                        edges.push(BTreeMap::new());
                        queue.push_back(to);
                        to
                    }
                };
                edges[node].insert(event.key(), PlanEdge { to, effects });
            }
        }

        Self {
            initial: 0,
            nodes: states
                .iter()
                .map(|state| PlanNode { phase: state.phase })
                .collect(),
            edges,
            blocked_errors: BLOCKED_ERROR_NAMES,
        }
    }

    /// Follow one event from `node`, as the page script does.
    pub fn step(&self, node: usize, key: &str) -> Option<&PlanEdge> {
        self.edges.get(node)?.get(key)
    }

    /// JSON that is safe to place inside a `<script>` element.
    pub fn to_embedded_json(&self) -> serde_json::Result<String> {
        Ok(serde_json::to_string(self)?.replace('<', "\\u003c"))
    }
}
