//! Prompt formatting
//!
//! Turns `(task, data)` into the `{prompt, context}` pair sent to the AI
//! agent. Formatting is total: missing or oddly typed fields fall back to
//! defaults, and unknown tasks pass the data through.

use crate::task::AiTask;
use serde::Serialize;
use serde_json::{Map, Value};

/// Comments beyond this are left out of sentiment prompts
const MAX_SENTIMENT_COMMENTS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedPrompt {
    pub prompt: String,
    pub context: Value,
}

/// Stateless prompt builder
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptFormatter;

impl PromptFormatter {
    pub fn format(task: &AiTask, data: &Value) -> FormattedPrompt {
        match task {
            AiTask::TrendAnalysis => trend_analysis(data),
            AiTask::AccountAnalysis => account_analysis(data),
            AiTask::CaptionGeneration => caption_generation(data),
            AiTask::HashtagSuggestion => hashtag_suggestion(data),
            AiTask::SentimentAnalysis => sentiment_analysis(data),
            AiTask::ReportAnalysis => report_analysis(data),
            AiTask::CampaignSuggestion => campaign_suggestion(data),
            AiTask::TextSummarization => text_summarization(data),
            AiTask::TextGeneration => text_generation(data),
            AiTask::CompetitorComparison => competitor_comparison(data),
            AiTask::Custom(_) => passthrough(data),
        }
    }
}

fn trend_analysis(data: &Value) -> FormattedPrompt {
    let niche = text_or(data, "niche", "general");
    let timeframe = text_or(data, "timeframe", "the last 7 days");
    let region = text(data, "region")
        .map(|r| format!(" in {}", r))
        .unwrap_or_default();

    let prompt = format!(
        "Analyze current Instagram trends for the {niche} niche{region} over {timeframe}. \
         Identify trending content formats, audio, topics and hashtags, rate each trend's \
         momentum, and suggest how a brand in this niche can take part."
    );

    FormattedPrompt {
        prompt,
        context: pick(data, &["niche", "region", "timeframe", "competitors"]),
    }
}

fn account_analysis(data: &Value) -> FormattedPrompt {
    let username = text_or(data, "username", "the account").trim_start_matches('@').to_string();
    let followers = scalar_or(data, "followers", "an unknown number of");
    let engagement = scalar(data, "engagementRate")
        .map(|rate| format!(" and an engagement rate of {}%", rate))
        .unwrap_or_default();
    let posts = data
        .get("recentPosts")
        .and_then(Value::as_array)
        .map(|posts| format!(" Its {} most recent posts are included in the context.", posts.len()))
        .unwrap_or_default();

    let prompt = format!(
        "Analyze the Instagram account @{username} with {followers} followers{engagement}.{posts} \
         Summarize its strengths and weaknesses, the content that performs best, and give \
         concrete recommendations to grow reach and engagement."
    );

    FormattedPrompt {
        prompt,
        context: pick(
            data,
            &["username", "followers", "following", "engagementRate", "bio", "recentPosts"],
        ),
    }
}

fn caption_generation(data: &Value) -> FormattedPrompt {
    let topic = text(data, "topic")
        .or_else(|| text(data, "description"))
        .unwrap_or("our latest post");
    let tone = text_or(data, "tone", "friendly");
    let length = text_or(data, "length", "medium");
    let hashtags = match data.get("includeHashtags").and_then(Value::as_bool) {
        Some(false) => "Do not include hashtags.",
        _ => "End with 5 to 10 relevant hashtags.",
    };
    let language = text(data, "language")
        .map(|l| format!(" Write it in {}.", l))
        .unwrap_or_default();

    let prompt = format!(
        "Write a {length} Instagram caption about {topic} in a {tone} tone. \
         Open with a hook, include a clear call to action. {hashtags}{language}"
    );

    FormattedPrompt {
        prompt,
        context: pick(
            data,
            &["topic", "description", "tone", "length", "includeHashtags", "language", "brand"],
        ),
    }
}

fn hashtag_suggestion(data: &Value) -> FormattedPrompt {
    let topic = text(data, "topic")
        .or_else(|| text(data, "caption"))
        .unwrap_or("general lifestyle content");
    let count = data.get("count").and_then(Value::as_u64).unwrap_or(15);
    let niche = text(data, "niche")
        .map(|n| format!(" in the {} niche", n))
        .unwrap_or_default();

    let prompt = format!(
        "Suggest {count} Instagram hashtags for a post about {topic}{niche}. \
         Mix high-volume, mid-volume and niche hashtags and label each with its expected reach."
    );

    FormattedPrompt {
        prompt,
        context: pick(data, &["topic", "caption", "niche", "count"]),
    }
}

fn sentiment_analysis(data: &Value) -> FormattedPrompt {
    let comments = list(data, "comments");
    let listed = comments
        .iter()
        .take(MAX_SENTIMENT_COMMENTS)
        .enumerate()
        .map(|(i, c)| format!("{}. {}", i + 1, c))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = if listed.is_empty() {
        let text = text_or(data, "text", "");
        format!(
            "Analyze the sentiment of the following text. Classify it as positive, neutral or \
             negative with a confidence score and explain the main drivers.\n\n{text}"
        )
    } else {
        format!(
            "Analyze the sentiment of these Instagram comments. Classify each as positive, \
             neutral or negative, give the overall sentiment distribution and list recurring \
             themes.\n\n{listed}"
        )
    };

    FormattedPrompt {
        prompt,
        context: pick(data, &["comments", "text", "postId"]),
    }
}

fn report_analysis(data: &Value) -> FormattedPrompt {
    let period = text_or(data, "period", "the reporting period");
    let metrics = data
        .get("metrics")
        .or_else(|| data.get("report"))
        .map(to_json)
        .unwrap_or_else(|| "{}".to_string());

    let prompt = format!(
        "Analyze this Instagram performance report for {period}. Highlight significant changes, \
         explain likely causes and recommend three priorities for the next period.\n\n{metrics}"
    );

    FormattedPrompt {
        prompt,
        context: pick(data, &["period", "metrics", "report", "previousMetrics"]),
    }
}

fn campaign_suggestion(data: &Value) -> FormattedPrompt {
    let goal = text_or(data, "goal", "brand awareness");
    let audience = text_or(data, "audience", "our target audience");
    let budget = scalar(data, "budget")
        .map(|b| format!(" with a budget of {}", b))
        .unwrap_or_default();
    let duration = text(data, "duration")
        .map(|d| format!(" running for {}", d))
        .unwrap_or_default();

    let prompt = format!(
        "Propose an Instagram campaign for {goal} aimed at {audience}{budget}{duration}. \
         Include the concept, content pillars, posting schedule, formats and the KPIs to track."
    );

    FormattedPrompt {
        prompt,
        context: pick(data, &["goal", "audience", "budget", "duration", "brand", "products"]),
    }
}

fn text_summarization(data: &Value) -> FormattedPrompt {
    let body = match data {
        Value::String(s) => s.as_str(),
        _ => text_or(data, "text", ""),
    };
    let max_words = data.get("maxLength").and_then(Value::as_u64).unwrap_or(100);

    let prompt = format!(
        "Summarize the following text in at most {max_words} words, keeping the key facts and \
         any action items.\n\n{body}"
    );

    FormattedPrompt {
        prompt,
        context: pick(data, &["maxLength", "source"]),
    }
}

fn text_generation(data: &Value) -> FormattedPrompt {
    let prompt = match data {
        Value::String(s) => s.clone(),
        _ => text(data, "prompt")
            .or_else(|| text(data, "instructions"))
            .map(str::to_string)
            .unwrap_or_else(|| to_json(data)),
    };

    let context = match data {
        Value::Object(map) => {
            let mut rest = map.clone();
            rest.remove("prompt");
            Value::Object(rest)
        }
        _ => Value::Object(Map::new()),
    };

    FormattedPrompt { prompt, context }
}

fn competitor_comparison(data: &Value) -> FormattedPrompt {
    let account = text_or(data, "account", "our account").trim_start_matches('@').to_string();
    let competitors = list(data, "competitors")
        .into_iter()
        .map(|c| format!("@{}", c.trim_start_matches('@')))
        .collect::<Vec<_>>();
    let competitors = if competitors.is_empty() {
        "its main competitors".to_string()
    } else {
        competitors.join(", ")
    };

    let prompt = format!(
        "Compare the Instagram account @{account} with {competitors}. Cover follower growth, \
         engagement, posting frequency, content mix and positioning, then list the opportunities \
         where @{account} can outperform them."
    );

    FormattedPrompt {
        prompt,
        context: pick(data, &["account", "competitors", "metrics"]),
    }
}

fn passthrough(data: &Value) -> FormattedPrompt {
    let prompt = match data {
        Value::String(s) => s.clone(),
        other => to_json(other),
    };
    let context = match data {
        Value::Object(_) => data.clone(),
        _ => Value::Object(Map::new()),
    };
    FormattedPrompt { prompt, context }
}

/// Non-empty string field
fn text<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn text_or<'a>(data: &'a Value, key: &str, default: &'a str) -> &'a str {
    text(data, key).unwrap_or(default)
}

/// String, number or bool field rendered for a sentence
fn scalar(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_or(data: &Value, key: &str, default: &str) -> String {
    scalar(data, key).unwrap_or_else(|| default.to_string())
}

/// Array field as display strings; objects use their `text` field when
/// present
fn list(data: &Value, key: &str) -> Vec<String> {
    data.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(_) => text(item, "text")
                        .or_else(|| text(item, "username"))
                        .map(str::to_string)
                        .or_else(|| Some(to_json(item))),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Object holding only the listed keys that are present
fn pick(data: &Value, keys: &[&str]) -> Value {
    let mut map = Map::new();
    for key in keys {
        if let Some(value) = data.get(*key) {
            if !value.is_null() {
                map.insert((*key).to_string(), value.clone());
            }
        }
    }
    Value::Object(map)
}

fn to_json(value: &Value) -> String {
    // serializing a Value cannot fail
    serde_json::to_string_pretty(value).unwrap_or_default()
}
