//! Conversion from stored turns to the generation service's history format.

use bonechat_types::chat::Turn;
use bonechat_types::llm::ExternalTurn;

/// Convert stored turns into `{role, parts: [{text}]}` entries.
///
/// Turns with a role other than `user`/`model`, or with empty content, are
/// skipped. Order is preserved.
pub fn to_external_format(turns: &[Turn]) -> Vec<ExternalTurn> {
    turns
        .iter()
        .filter(|turn| turn.role().is_conversational() && !turn.content().is_empty())
        .map(|turn| ExternalTurn::text(turn.role().to_string(), turn.content()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonechat_types::chat::Role;
    use serde_json::json;

    #[test]
    fn test_empty_input() {
        assert!(to_external_format(&[]).is_empty());
    }

    #[test]
    fn test_alternating_log_preserves_length_and_roles() {
        let turns: Vec<Turn> = (0..10)
            .map(|i| {
                if i % 2 == 0 {
                    Turn::user(format!("q{i}"))
                } else {
                    Turn::model(format!("a{i}"))
                }
            })
            .collect();

        let external = to_external_format(&turns);
        assert_eq!(external.len(), turns.len());
        for (ext, turn) in external.iter().zip(&turns) {
            assert_eq!(ext.role, turn.role().to_string());
            assert_eq!(ext.parts.len(), 1);
            assert_eq!(ext.parts[0].text, turn.content());
        }
    }

    #[test]
    fn test_malformed_turns_are_dropped() {
        let turns: Vec<Turn> = serde_json::from_value(json!([
            {"role": "user", "content": "hi"},
            {"role": "model", "content": ""},
            {"role": "system", "content": "be nice"},
            {"role": "model", "content": "hello"},
            {"content": "no role"},
            {"role": "user"},
            {"role": "user", "content": "bye"},
        ]))
        .unwrap();

        let external = to_external_format(&turns);
        assert_eq!(external.len(), turns.len() - 4);

        let roles: Vec<_> = external.iter().map(|t| t.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        let texts: Vec<_> = external.iter().map(|t| t.parts[0].text.as_str()).collect();
        assert_eq!(texts, vec!["hi", "hello", "bye"]);
    }

    #[test]
    fn test_unknown_role_with_content_is_dropped() {
        let turns = vec![Turn::new(Role::Unknown, "something")];
        assert!(to_external_format(&turns).is_empty());
    }

    #[test]
    fn test_wire_shape() {
        let external = to_external_format(&[Turn::model("Hi!")]);
        assert_eq!(
            serde_json::to_value(&external).unwrap(),
            json!([{"role": "model", "parts": [{"text": "Hi!"}]}])
        );
    }
}
