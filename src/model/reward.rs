use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::progress_state::StatKey;

/// Structured reward produced by the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub xp: i32,
    pub stat: StatKey,
    #[serde(rename = "msg")]
    pub message: String,
}

/// Decode a raw JSON object into a Reward.
///
/// Lenient about number formatting (`15`, `15.0`, `"15"`) and stat casing,
/// strict about the three keys being present.
pub fn decode_reward(json: &str) -> Result<Reward, String> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| format!("Invalid oracle JSON: {}", e))?;

    let Value::Object(fields) = value else {
        return Err("Oracle reply must be a JSON object".to_string());
    };

    let xp = match fields.get("xp") {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| format!("xp is not an integer: {}", n))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("xp is not an integer: {:?}", s))?,
        Some(other) => return Err(format!("xp has unexpected type: {}", other)),
        None => return Err("missing key 'xp'".to_string()),
    };
    let xp = i32::try_from(xp).map_err(|_| format!("xp out of range: {}", xp))?;

    let stat = fields
        .get("stat")
        .and_then(|s| s.as_str())
        .ok_or_else(|| "missing key 'stat'".to_string())?
        .parse::<StatKey>()?;

    let message = fields
        .get("msg")
        .and_then(|m| m.as_str())
        .ok_or_else(|| "missing key 'msg'".to_string())?
        .to_string();

    Ok(Reward { xp, stat, message })
}
