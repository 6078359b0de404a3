use serde::de::DeserializeOwned;

use crate::{wire, ChatMessage, ChatReply, HairscanError, StageVerdict};

/// Turns a final status and body into `T`, or the matching error.
pub(crate) fn decode_json_response<T: DeserializeOwned>(
    status: u16,
    body: &str,
) -> Result<T, HairscanError> {
    if !(200..300).contains(&status) {
        return Err(HairscanError::Http {
            status,
            body: body.to_owned(),
        });
    }

    serde_json::from_str::<T>(body).map_err(|err| {
        HairscanError::Decode(format!("invalid response JSON: {err}; body: {body}"))
    })
}

pub(crate) fn decode_stage_verdict(
    stage: &str,
    response: wire::StageResponse,
) -> Result<StageVerdict, HairscanError> {
    let label = response
        .label
        .map(|label| label.trim().to_owned())
        .filter(|label| !label.is_empty())
        .ok_or_else(|| HairscanError::Decode(format!("missing label in '{stage}' verdict")))?;

    let confidence = response.confidence.ok_or_else(|| {
        HairscanError::Decode(format!("missing confidence in '{stage}' verdict"))
    })?;
    ensure_probability(stage, "confidence", confidence)?;

    let scores = response
        .scores
        .into_iter()
        .map(|(name, score)| {
            ensure_probability(stage, &name, score)?;
            Ok((name, score))
        })
        .collect::<Result<Vec<_>, HairscanError>>()?;

    Ok(StageVerdict {
        stage: stage.to_owned(),
        label,
        confidence,
        accepted: response.accepted.unwrap_or(true),
        message: response.message.filter(|message| !message.trim().is_empty()),
        scores,
    })
}

pub(crate) fn decode_chat_reply(response: wire::ChatResponse) -> Result<ChatReply, HairscanError> {
    let reply = response
        .reply
        .filter(|reply| !reply.trim().is_empty())
        .ok_or_else(|| HairscanError::Decode("chat response has no reply text".to_owned()))?;

    Ok(ChatReply {
        message: ChatMessage::assistant(reply),
        suggestions: response
            .suggestions
            .into_iter()
            .filter(|suggestion| !suggestion.trim().is_empty())
            .collect(),
    })
}

fn ensure_probability(stage: &str, field: &str, value: f64) -> Result<(), HairscanError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(HairscanError::Decode(format!(
            "'{field}' in '{stage}' verdict must be within [0, 1], got {value}"
        )))
    }
}
