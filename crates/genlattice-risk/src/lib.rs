//! Re-identification risk of a release under a probabilistic attacker model.
//!
//! The attacker always knows the protected columns and knows each sensitive
//! column independently with a given probability. A record's risk is its
//! expected chance of being singled out over every knowledge state.

pub mod concealing;
pub mod knowledge;

pub use concealing::{group_release, m_concealing, p_reid_in_state, RiskReport};
pub use knowledge::{
    known_columns, knowing_probabilities, knowledge_states, p_knowledge_state, KnowledgeState,
};
