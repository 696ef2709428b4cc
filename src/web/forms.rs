//! Typed form payloads. Every field deserializes with a default so that a
//! missing field reaches `validate()` and is reported by name instead of
//! failing inside the extractor.

use serde::Deserialize;

use super::errors::AppError;
use crate::models::{NewItem, NewTask, NewWantedRequest, Urgency};
use crate::session::Identity;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub name: String,
    pub email: String,
}

impl LoginForm {
    /// Returns `(name, email)`. Emails compare case-insensitively.
    pub fn validate(self) -> Result<(String, String), AppError> {
        let name = required("name", &self.name)?;
        let email = required("email", &self.email)?.to_lowercase();
        if !email.contains('@') {
            return Err(AppError::Validation(format!(
                "email must contain '@': {email}"
            )));
        }
        Ok((name, email))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostTaskForm {
    pub title: String,
    pub description: String,
    pub location: String,
    pub reward: String,
}

impl PostTaskForm {
    pub fn validate(self, poster: &Identity) -> Result<NewTask, AppError> {
        Ok(NewTask {
            title: optional(&self.title),
            description: required("description", &self.description)?,
            location: optional(&self.location),
            reward: amount("reward", &self.reward)?,
            posted_by: poster.name.clone(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListItemForm {
    pub item_name: String,
    pub description: String,
    pub category: String,
    pub price: String,
}

impl ListItemForm {
    pub fn validate(self, owner: &Identity) -> Result<NewItem, AppError> {
        Ok(NewItem {
            item_name: required("item_name", &self.item_name)?,
            description: optional(&self.description),
            category: optional(&self.category),
            price_per_day: amount("price", &self.price)?,
            owner_name: owner.name.clone(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostWantedForm {
    pub item_name: String,
    pub budget: String,
    pub urgency: String,
}

impl PostWantedForm {
    pub fn validate(self, requester: &Identity) -> Result<NewWantedRequest, AppError> {
        let urgency = required("urgency", &self.urgency)?;
        Ok(NewWantedRequest {
            item_name: required("item_name", &self.item_name)?,
            max_budget: amount("budget", &self.budget)?,
            requester_name: requester.name.clone(),
            urgency: Urgency::from_str(&urgency).map_err(AppError::Validation)?,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::Validation(format!("missing required field: {field}")))
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A non-negative, finite money amount.
fn amount(field: &str, value: &str) -> Result<f64, AppError> {
    let raw = required(field, value)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Ok(_) => Err(AppError::Validation(format!(
            "{field} must be zero or more: {raw}"
        ))),
        Err(_) => Err(AppError::Validation(format!(
            "{field} must be a number: {raw}"
        ))),
    }
}
