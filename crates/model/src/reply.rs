use alloc::string::String;
use serde::{Deserialize, Serialize};

/// Server verdict on a feedback submission.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub success: bool,
    /// Reason for the failure, if the server gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Reply {
    pub const fn accepted() -> Self {
        Self { success: true, message: None }
    }

    pub fn rejected(message: String) -> Self {
        Self { success: false, message: Some(message) }
    }
}

#[cfg(test)]
mod tests {

    use super::Reply;

    #[test]
    fn accepted_omits_message() {
        assert_eq!(serde_json::to_string(&Reply::accepted()).unwrap(), r#"{"success":true}"#);
    }

    #[test]
    fn ignores_unknown_fields() {
        let reply: Reply = serde_json::from_str(r#"{"success":false,"code":7}"#).unwrap();
        assert!(!reply.success);
        assert!(reply.message.is_none());
    }
}
