//! # QA Orchestrator
//!
//! Answers follow-up questions about a ranked set. Each turn regenerates
//! the grounding block from the current [`RecommendationSet`], replays the
//! prior conversation in order, asks the judge, and appends exactly one
//! (question, answer) pair to the log — judge failure included, where the
//! answer becomes a fixed apology carrying the failure detail. The caller
//! keeps the returned log as the state for the next turn.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use collectors::SearchProvider;
use judge::{ChatMessage, Judge};
use model::{ConversationLog, EventId, RecommendationSet};
use pipeline::{build_grounding_block, qa_instructions};

/// Outcome of one Q&A turn: the answer plus the new authoritative log.
#[derive(Debug, Clone)]
pub struct QaTurn {
    pub answer: String,
    pub log: ConversationLog,
}

/// Follow-up question answering over a fixed ranked set.
pub struct QaOrchestrator {
    judge: Arc<dyn Judge>,
    search: Option<Arc<dyn SearchProvider>>,
}

impl QaOrchestrator {
    pub fn new(judge: Arc<dyn Judge>) -> Self {
        Self {
            judge,
            search: None,
        }
    }

    /// Attach the optional search collaborator for description enrichment.
    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    /// Gather supplementary notes for events whose catalog description is
    /// empty. Run once per ranked set, not per turn; every failure
    /// degrades to "no notes" and never blocks a turn.
    pub async fn prepare_enrichment(&self, recs: &RecommendationSet) -> HashMap<EventId, String> {
        let Some(search) = &self.search else {
            return HashMap::new();
        };

        let mut notes = HashMap::new();
        for rec in &recs.recommendations {
            let event = &rec.event;
            if !event.description.trim().is_empty() {
                continue;
            }
            let query = format!("{} {} {}", event.name, event.venue_name, recs.request.city);
            match search.search(&query).await {
                Ok(hits) => {
                    if let Some(hit) = hits.into_iter().find(|hit| !hit.snippet.is_empty()) {
                        notes.insert(event.id.clone(), hit.snippet);
                    }
                }
                Err(err) => {
                    debug!("enrichment lookup failed for {}: {err}", event.id);
                }
            }
        }

        if !notes.is_empty() {
            info!("enriched {} sparse event descriptions", notes.len());
        }
        notes
    }

    /// Answer one follow-up question and return the updated log.
    pub async fn answer_question(
        &self,
        recs: &RecommendationSet,
        enrichment: &HashMap<EventId, String>,
        log: &ConversationLog,
        question: &str,
    ) -> QaTurn {
        // Instructions + grounding first, then every prior turn in its
        // original order, then the new question
        let system = format!(
            "{}\n\n{}",
            qa_instructions(),
            build_grounding_block(recs, enrichment)
        );

        let mut history: Vec<ChatMessage> = log
            .messages()
            .iter()
            .map(|msg| ChatMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
            })
            .collect();
        history.push(ChatMessage::user(question));

        let answer = match self.judge.complete(&system, &history).await {
            Ok(text) => text,
            Err(err) => {
                warn!("QA judge call failed: {err}");
                format!("Sorry, I encountered an error: {err}. Please try again.")
            }
        };

        let log = log.append_turn(question, answer.clone());
        QaTurn { answer, log }
    }
}
