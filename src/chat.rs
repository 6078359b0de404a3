use crate::{
    decode::decode_chat_reply, wire, Body, ChatMessage, ChatReply, HairscanError, Request,
    ResilientClient, Result,
};

/// Client for the consultation chat endpoint.
///
/// Holds no conversation state; callers pass the history they want the
/// backend to see.
#[derive(Clone, Debug)]
pub struct ChatClient {
    client: ResilientClient,
    endpoint_url: String,
}

impl ChatClient {
    pub fn new(client: ResilientClient, endpoint_url: impl Into<String>) -> Self {
        Self {
            client,
            endpoint_url: endpoint_url.into(),
        }
    }

    /// Sends `history` followed by a new user `message` and returns the reply.
    pub async fn reply(&self, history: &[ChatMessage], message: &str) -> Result<ChatReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(HairscanError::InvalidRequest(
                "chat message cannot be empty".to_owned(),
            ));
        }

        let user = ChatMessage::user(message);
        let payload = wire::ChatRequest {
            messages: history.iter().chain(std::iter::once(&user)).collect(),
        };
        let request = Request::post(self.endpoint_url.as_str())
            .header("accept", "application/json")
            .body(Body::json(&payload)?);

        let response: wire::ChatResponse = self.client.send_json(request).await?;
        decode_chat_reply(response)
    }
}

#[cfg(test)]
mod tests {
    use super::ChatClient;
    use crate::{HairscanError, ResilientClient};

    #[tokio::test]
    async fn blank_message_is_rejected_locally() {
        let chat = ChatClient::new(ResilientClient::new(), "http://127.0.0.1:9/chat");
        let err = chat.reply(&[], "   ").await.expect_err("blank must fail");
        assert!(matches!(err, HairscanError::InvalidRequest(_)));
    }
}
