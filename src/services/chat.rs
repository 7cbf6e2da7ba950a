//! Chat service — report context + client history → model reply.

use tracing::info;

use super::history::{ChatTurn, normalize};
use super::prompts::{ReportContext, chat_system_instruction};
use crate::llm::{CompletionGateway, GatewayError};

/// Answer one chat message in the context of a diagnosis report.
///
/// # Errors
///
/// Returns the gateway error unchanged; there is no retry here.
pub async fn reply(
    gateway: &dyn CompletionGateway,
    message: &str,
    report: &ReportContext,
    history: &[ChatTurn],
) -> Result<String, GatewayError> {
    let summary = report.summary();
    let system = chat_system_instruction(&summary);
    let history = normalize(history);

    info!(
        plant = %summary.plant_name,
        history_turns = history.len(),
        message_len = message.len(),
        "chat: sending message"
    );

    let reply = gateway
        .complete_chat(&system, &history, message)
        .await?;

    info!(reply_len = reply.len(), "chat: reply received");
    Ok(reply)
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
