use axum::Json;
use serde::Serialize;

/// Success envelope `{success, message, data}` shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }
}

impl Envelope<()> {
    /// Success response carrying no data.
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_with_data_serializes_all_fields() {
        let Json(env) = Envelope::ok("Projects retrieved successfully", vec!["a", "b"]);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Projects retrieved successfully");
        assert_eq!(json["data"][1], "b");
    }

    #[test]
    fn message_envelope_omits_data() {
        let Json(env) = Envelope::message("Project deleted successfully");
        let json = serde_json::to_value(&env).unwrap();
        assert!(json.get("data").is_none());
    }
}
