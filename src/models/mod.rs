use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trust score every new user starts with.
pub const DEFAULT_TRUST_SCORE: i64 = 100;

/// Trust awarded to the accepting user when a task is completed.
pub const TRUST_REWARD: i64 = 5;

/// Lifecycle of a micro-task. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    Accepted,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Accepted => "accepted",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "open" => Ok(TaskStatus::Open),
            "accepted" => Ok(TaskStatus::Accepted),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(format!("unknown task status: {s}")),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WantedStatus {
    Open,
    Fulfilled,
}

impl WantedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WantedStatus::Open => "open",
            WantedStatus::Fulfilled => "fulfilled",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "open" => Ok(WantedStatus::Open),
            "fulfilled" => Ok(WantedStatus::Fulfilled),
            _ => Err(format!("unknown request status: {s}")),
        }
    }
}

impl fmt::Display for WantedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How soon the requester needs a wanted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Urgency::Low, Urgency::Medium, Urgency::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" | "normal" => Ok(Urgency::Medium),
            "high" | "urgent" => Ok(Urgency::High),
            _ => Err(format!(
                "invalid urgency: {s}. valid values: low, medium, high"
            )),
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub trust_score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: Option<String>,
    pub description: String,
    pub location: Option<String>,
    pub reward: f64,
    pub posted_by: String,
    pub accepted_by: Option<String>,
    pub accepted_by_user: Option<i64>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Heading shown on the board: the title when present, else the description.
    pub fn heading(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.description)
    }
}

/// A validated task ready to insert; the database assigns id, status and timestamp.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: Option<String>,
    pub description: String,
    pub location: Option<String>,
    pub reward: f64,
    pub posted_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub item_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_per_day: f64,
    pub owner_name: String,
    pub is_available: bool,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub item_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_per_day: f64,
    pub owner_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WantedRequest {
    pub id: i64,
    pub item_name: String,
    pub max_budget: f64,
    pub requester_name: String,
    pub urgency: Urgency,
    pub status: WantedStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWantedRequest {
    pub item_name: String,
    pub max_budget: f64,
    pub requester_name: String,
    pub urgency: Urgency,
}

/// Outcome of a task state change that may legitimately do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Skipped,
}
