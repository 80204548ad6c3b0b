use tracing::debug;

use crate::engine::llm_client::TextGenerator;
use crate::engine::prompt_builder::PromptBuilder;
use crate::error::OracleError;
use crate::model::reward::{decode_reward, Reward};

/// Classify a free-text report into a reward.
///
/// Does not touch any state: the caller feeds the reward into
/// `apply_reward`.
pub fn classify_report(
    backend: Option<&dyn TextGenerator>,
    narrative: &str,
) -> Result<Reward, OracleError> {
    let backend = backend.ok_or(OracleError::NoServiceConfigured)?;
    if narrative.trim().is_empty() {
        return Err(OracleError::EmptyNarrative);
    }

    let prompt = PromptBuilder::oracle(narrative);
    let raw = backend.generate(&prompt)?;
    parse_reward(&raw)
}

/// Pull a reward out of raw model text that may wrap the JSON in prose.
pub fn parse_reward(raw: &str) -> Result<Reward, OracleError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| OracleError::malformed("no JSON object in response", raw))?;
    debug!(json, "extracted oracle json");
    decode_reward(json).map_err(|reason| OracleError::malformed(reason, raw))
}

/// Greedy span from the first `{` to the last `}`. Several objects in one
/// reply produce an unparseable span; that case is not recovered.
pub fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}
