use alloc::string::String;
use serde::{Deserialize, Serialize};

/// Answers collected from a single submission of the feedback form. Missing fields decode
/// to their defaults so that older clients (and unanswered questions) still go through.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Feedback {
    /// Rating of the quest itself. Zero means the question was left unanswered.
    pub quest: u8,
    /// Rating of the box artwork.
    pub artwork: u8,
    /// Overall impression.
    pub overall: u8,
    /// Rating of the physical quality of the jigsaw.
    pub quality: u8,
    /// Why the customer would (or would not) buy another box.
    pub reason_to_buy: String,
    /// Free-form remarks.
    pub optional: String,
    /// Whether the customer intends to buy the next box. The form does not send this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_next: Option<String>,
}
