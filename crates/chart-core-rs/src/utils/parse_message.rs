use chart_error_rs::{Error, Result};

use crate::protocol::{
    constants::{JSONRPC_EXPECTED_VERSION, JSONRPC_VERSION_FIELD},
    message::JsonRpcMessage,
};

/// Parses a JSON-RPC message from a string, validating structure and version.
pub fn parse_json_rpc_message(line: &str) -> Result<JsonRpcMessage> {
    let value: serde_json::Value = serde_json::from_str(line)?;
    let Some(obj) = value.as_object() else {
        return Err(Error::InvalidMessage(
            "Message must be a JSON object".into(),
        ));
    };

    match obj.get(JSONRPC_VERSION_FIELD) {
        Some(serde_json::Value::String(v)) if v == JSONRPC_EXPECTED_VERSION => {}
        _ => {
            return Err(Error::InvalidMessage(
                "Missing or invalid jsonrpc version".into(),
            ));
        }
    }

    let msg = serde_json::from_value(value)?;
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_request_line() {
        let msg = parse_json_rpc_message(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
            .unwrap();
        assert!(matches!(msg, JsonRpcMessage::Request(_)));
    }

    #[test]
    fn rejects_non_object_payloads() {
        assert!(parse_json_rpc_message("[1,2,3]").is_err());
    }

    #[test]
    fn rejects_wrong_version() {
        assert!(parse_json_rpc_message(r#"{"jsonrpc":"1.0","id":1,"method":"x"}"#).is_err());
    }
}
