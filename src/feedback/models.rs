use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Author display info embedded in feedback and comments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
}

/// A feedback item with its comments and active claps.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub user_id: String,
    pub company_id: String,
    pub person: Person,
    pub title: String,
    pub description: String,
    pub comments: Vec<Comment>,
    pub claps: Vec<Clap>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub feedback_id: String,
    pub person: Person,
    pub comment: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Clap {
    pub id: String,
    pub user_id: String,
    pub feedback_id: String,
}

#[derive(Debug, FromRow)]
pub(crate) struct FeedbackRow {
    pub id: String,
    pub user_id: String,
    pub company_id: String,
    pub firstname: String,
    pub lastname: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl FeedbackRow {
    pub(crate) fn into_feedback(self) -> Feedback {
        Feedback {
            person: Person {
                id: self.user_id.clone(),
                firstname: self.firstname,
                lastname: self.lastname,
            },
            id: self.id,
            user_id: self.user_id,
            company_id: self.company_id,
            title: self.title,
            description: self.description,
            comments: Vec::new(),
            claps: Vec::new(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CommentRow {
    pub id: String,
    pub feedback_id: String,
    pub user_id: String,
    pub firstname: String,
    pub lastname: String,
    pub comment: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            feedback_id: row.feedback_id,
            person: Person {
                id: row.user_id,
                firstname: row.firstname,
                lastname: row.lastname,
            },
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Body for creating or updating feedback. Missing fields read as empty
/// and fail validation.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FeedbackRequest {
    pub title: String,
    pub description: String,
}

/// Body for the comment endpoint; with `id` it edits that comment.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CommentRequest {
    pub id: Option<String>,
    pub comment: String,
}

/// Whether a toggle left the caller's clap active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClapState {
    Clapped,
    Unclapped,
}

/// Client → server frames on the feedback socket.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FeedbackAction {
    Create {
        title: String,
        description: String,
    },
    Clap {
        feedback_id: String,
    },
    Comment {
        feedback_id: String,
        comment: String,
    },
    UpdateComment {
        comment_id: String,
        comment: String,
    },
}

/// Server → client frames on the feedback socket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedbackEvent {
    Feedback { feedback: Vec<Feedback> },
    Error { code: String, message: String },
}
