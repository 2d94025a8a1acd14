//! Chat assistant.
//!
//! Conversations go to an OpenRouter-compatible provider when one is
//! configured. Without a provider the assistant answers from templates over
//! the proposal catalog. Provider failures never reach the user as errors; they
//! get [`APOLOGY`] instead.

mod openrouter;

pub use openrouter::{CompletionRequest, LlmError, LlmProvider, OpenRouterProvider};

use std::sync::Arc;

use crate::models::{ChatMessage, ChatRole, Eip};
use crate::services::EipService;

pub const APOLOGY: &str =
    "Sorry, I couldn't reach the assistant right now. Please try again in a moment.";

const SYSTEM_PROMPT: &str = "You are an assistant for an Ethereum Improvement Proposal dashboard. \
Answer questions about EIPs, their status and the projects implementing them. \
Be concise and say so when you are unsure.";

const HELP_TEXT: &str = "I can explain Ethereum Improvement Proposals. \
Ask about a specific proposal, for example \"What is EIP-1559?\", \
or open a proposal page and ask about it directly.";

/// Provider settings for the assistant.
pub struct ProviderConfig {
    pub provider: Arc<dyn LlmProvider>,
    pub model: String,
}

pub struct AssistantService {
    provider: Option<ProviderConfig>,
    eips: Arc<EipService>,
}

impl AssistantService {
    pub fn new(provider: Option<ProviderConfig>, eips: Arc<EipService>) -> Self {
        Self { provider, eips }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Reply to the conversation `history`, optionally about proposal
    /// `eip_number`. Always returns text.
    pub async fn send(&self, history: &[ChatMessage], eip_number: Option<u32>) -> String {
        let context = match eip_number {
            Some(number) => self.eips.get_eip(number).await,
            None => None,
        };

        let Some(config) = &self.provider else {
            return self.canned_reply(history, context.as_ref()).await;
        };

        let mut system = SYSTEM_PROMPT.to_string();
        if let Some(eip) = &context {
            system.push_str("\n\nThe user is looking at this proposal:\n");
            system.push_str(&summarize(eip));
        }

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage {
            role: ChatRole::System,
            content: system,
        });
        messages.extend(
            history
                .iter()
                .filter(|m| m.role != ChatRole::System)
                .cloned(),
        );

        let request = CompletionRequest {
            model: config.model.clone(),
            temperature: 0.3,
            max_tokens: 800,
            messages,
        };

        match config.provider.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, "assistant provider failed");
                APOLOGY.to_string()
            }
        }
    }

    async fn canned_reply(&self, history: &[ChatMessage], context: Option<&Eip>) -> String {
        if let Some(eip) = context {
            return summarize(eip);
        }

        let mentioned = history
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .and_then(|m| mentioned_number(&m.content));

        match mentioned {
            Some(number) => match self.eips.get_eip(number).await {
                Some(eip) => summarize(&eip),
                None => format!(
                    "I don't have EIP-{number} in the catalog. {HELP_TEXT}"
                ),
            },
            None => HELP_TEXT.to_string(),
        }
    }
}

fn summarize(eip: &Eip) -> String {
    let classification = match eip.category {
        Some(category) => format!("{} ({})", eip.eip_type, category),
        None => eip.eip_type.to_string(),
    };
    format!(
        "EIP-{}: {}\nStatus: {}\nType: {}\nAuthors: {}\n\n{}",
        eip.number,
        eip.title,
        eip.status,
        classification,
        eip.author.join(", "),
        eip.description
    )
}

/// First proposal number referenced as `EIP-n`, `EIP n`, `ERC-n` or `ERCn`.
fn mentioned_number(text: &str) -> Option<u32> {
    let upper = text.to_ascii_uppercase();
    ["EIP", "ERC"]
        .into_iter()
        .flat_map(|prefix| upper.match_indices(prefix).map(|(i, p)| i + p.len()))
        .filter_map(|start| {
            let rest = upper[start..].trim_start_matches(['-', ' ', '#']);
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
        .next()
}
