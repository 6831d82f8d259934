//! LLM-backed answer grading.
//!
//! Sends the question and the learner's explanation to a chat-completions
//! endpoint and expects a strict JSON reply with a 0-5 score and feedback.
//! A reply that cannot be parsed is a hard failure: a made-up score would
//! silently corrupt the review schedule.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::config::GraderConfig;
use crate::domain::Question;
use crate::srs::clamp_score;

/// Result of grading one submitted answer.
#[derive(Debug, Clone, Serialize)]
pub struct GradedAnswer {
  pub score: i64,
  pub feedback: String,
}

#[derive(Debug)]
pub enum GradeError {
  Http(reqwest::Error),
  BadResponse(String),
}

impl std::fmt::Display for GradeError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Http(e) => write!(f, "grading request failed: {}", e),
      Self::BadResponse(msg) => write!(f, "grading response unusable: {}", msg),
    }
  }
}

impl std::error::Error for GradeError {}

impl From<reqwest::Error> for GradeError {
  fn from(e: reqwest::Error) -> Self {
    Self::Http(e)
  }
}

/// Shape of the JSON document the model is instructed to emit.
#[derive(Debug, Deserialize)]
struct GraderReply {
  score: i64,
  feedback: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
  message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
  content: String,
}

pub struct LlmGrader {
  client: reqwest::Client,
  config: GraderConfig,
}

impl LlmGrader {
  pub fn new(config: GraderConfig) -> Result<Self, GradeError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  /// Grade a learner's explanation of their approach to `question`.
  pub async fn grade(&self, question: &Question, answer: &str) -> Result<GradedAnswer, GradeError> {
    let body = json!({
      "model": self.config.model,
      "temperature": 0.1,
      "response_format": { "type": "json_object" },
      "messages": [
        {
          "role": "system",
          "content": "You are an expert algorithm tutor. You reply with a single JSON object and nothing else.",
        },
        {
          "role": "user",
          "content": scoring_prompt(question, answer),
        },
      ],
    });

    let response = self
      .client
      .post(&self.config.endpoint)
      .bearer_auth(&self.config.api_key)
      .json(&body)
      .send()
      .await?
      .error_for_status()?;

    let chat: ChatResponse = response.json().await?;
    let content = chat
      .choices
      .first()
      .map(|c| c.message.content.as_str())
      .ok_or_else(|| GradeError::BadResponse("empty choices".to_string()))?;

    parse_reply(content)
  }
}

fn scoring_prompt(question: &Question, answer: &str) -> String {
  format!(
    r#"Evaluate a student's understanding of an algorithm problem.

**Problem:** {}

**Problem Description:**
{}

**Student's Explanation:**
{}

---

Score the explanation from 0 to 5:
- 5: Perfect understanding
- 4: Strong understanding, minor gaps
- 3: Acceptable, some conceptual gaps
- 2: Weak, flawed approach
- 1: Poor, incorrect approach
- 0: No understanding

Then write 2-4 paragraphs of feedback covering what they got right, what
they missed, and how to improve.

Respond with ONLY valid JSON, no markdown, no backticks:
{{"score": <0-5>, "feedback": "<feedback>"}}"#,
    question.title, question.statement, answer
  )
}

/// Parse the model's reply, tolerating markdown code fences around the JSON.
fn parse_reply(content: &str) -> Result<GradedAnswer, GradeError> {
  let cleaned = strip_code_fences(content);
  let reply: GraderReply = serde_json::from_str(cleaned)
    .map_err(|e| GradeError::BadResponse(format!("{} in {:?}", e, cleaned)))?;
  Ok(GradedAnswer {
    score: clamp_score(reply.score),
    feedback: reply.feedback,
  })
}

fn strip_code_fences(content: &str) -> &str {
  let trimmed = content.trim();
  let trimmed = trimmed
    .strip_prefix("```json")
    .or_else(|| trimmed.strip_prefix("```"))
    .unwrap_or(trimmed);
  trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}
