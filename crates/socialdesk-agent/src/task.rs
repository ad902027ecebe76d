use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Kind of work requested from the AI agent
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AiTask {
    TrendAnalysis,
    AccountAnalysis,
    CaptionGeneration,
    HashtagSuggestion,
    SentimentAnalysis,
    ReportAnalysis,
    CampaignSuggestion,
    TextSummarization,
    TextGeneration,
    CompetitorComparison,
    /// Any other label; formatted as a passthrough
    Custom(String),
}

impl AiTask {
    pub const KNOWN: [AiTask; 10] = [
        AiTask::TrendAnalysis,
        AiTask::AccountAnalysis,
        AiTask::CaptionGeneration,
        AiTask::HashtagSuggestion,
        AiTask::SentimentAnalysis,
        AiTask::ReportAnalysis,
        AiTask::CampaignSuggestion,
        AiTask::TextSummarization,
        AiTask::TextGeneration,
        AiTask::CompetitorComparison,
    ];

    /// Wire name sent as the `task` field
    pub fn as_str(&self) -> &str {
        match self {
            Self::TrendAnalysis => "analyze_trends",
            Self::AccountAnalysis => "analyze_account",
            Self::CaptionGeneration => "generate_caption",
            Self::HashtagSuggestion => "suggest_hashtags",
            Self::SentimentAnalysis => "analyze_sentiment",
            Self::ReportAnalysis => "analyze_report",
            Self::CampaignSuggestion => "suggest_campaign",
            Self::TextSummarization => "summarize_text",
            Self::TextGeneration => "generate_text",
            Self::CompetitorComparison => "compare_competitors",
            Self::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl FromStr for AiTask {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let task = Self::KNOWN
            .iter()
            .find(|task| task.as_str() == s)
            .cloned()
            .unwrap_or_else(|| Self::Custom(s.to_string()));
        Ok(task)
    }
}

impl From<&str> for AiTask {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(task) => task,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for AiTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AiTask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AiTask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(AiTask::from(name.as_str()))
    }
}
