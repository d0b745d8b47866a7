//! Classification of raw Trello webhook deliveries into relay events.
//!
//! Trello posts one JSON document per board action. The documents are large
//! and their shape varies by action type, so nothing here deserializes into a
//! fixed struct: only `action.type` and a handful of `action.data` fields are
//! looked at, and anything unexpected simply means "not relevant".

use events::{EventKind, NormalizedEvent, Topic};
use serde_json::Value;

/// Maps a Trello action type to the relay's event kind.
///
/// `data` is the action's `data` object; an `updateCard` that carries a
/// `listBefore` or `listAfter` reference moved the card between lists.
fn classify(action_type: &str, data: &Value) -> Option<EventKind> {
    match action_type {
        "createCard" => Some(EventKind::TaskCreated),
        "updateCard" => {
            if is_present(data, "listBefore") || is_present(data, "listAfter") {
                Some(EventKind::TaskMoved)
            } else {
                Some(EventKind::TaskUpdated)
            }
        }
        "deleteCard" | "closeCard" => Some(EventKind::TaskDeleted),
        _ => None,
    }
}

fn is_present(data: &Value, field: &str) -> bool {
    data.get(field).is_some_and(|value| !value.is_null())
}

/// Turns a raw webhook payload into a [`NormalizedEvent`].
///
/// Returns `None` when the payload has no `action.data.board.id`, when the
/// action type isn't one of the modeled card actions, or when `action.data`
/// isn't an object. Never panics, whatever the input looks like.
pub fn normalize(raw: &Value) -> Option<NormalizedEvent> {
    let action = raw.get("action")?;
    let data = action.get("data")?;
    let payload = data.as_object()?;

    let topic = data
        .get("board")
        .and_then(|board| board.get("id"))
        .and_then(Value::as_str)
        .and_then(Topic::new)?;

    let action_type = action.get("type").and_then(Value::as_str)?;
    let kind = classify(action_type, data)?;

    Some(NormalizedEvent::new(topic, kind, payload.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn delivery(action_type: &str, data: Value) -> Value {
        json!({
            "model": {"id": "B1", "name": "Hiring"},
            "action": {
                "id": "5f1",
                "idMemberCreator": "m1",
                "type": action_type,
                "date": "2025-01-10T12:00:00.000Z",
                "data": data
            }
        })
    }

    fn card_data() -> Value {
        json!({
            "board": {"id": "B1", "name": "Hiring", "shortLink": "abc"},
            "list": {"id": "L1", "name": "To Do"},
            "card": {"id": "C1", "name": "X", "idShort": 4}
        })
    }

    #[test]
    fn test_create_card_is_task_created() {
        let event = normalize(&delivery("createCard", card_data())).unwrap();
        assert_eq!(event.kind(), EventKind::TaskCreated);
        assert_eq!(event.topic().as_str(), "B1");
        assert_eq!(event.payload().get("card"), Some(&json!({"id": "C1", "name": "X", "idShort": 4})));
    }

    #[test]
    fn test_update_card_with_list_change_is_task_moved() {
        let mut data = card_data();
        data["listBefore"] = json!({"id": "L1", "name": "To Do"});
        data["listAfter"] = json!({"id": "L2", "name": "Doing"});
        let event = normalize(&delivery("updateCard", data)).unwrap();
        assert_eq!(event.kind(), EventKind::TaskMoved);
    }

    #[test]
    fn test_update_card_with_only_one_list_reference_is_task_moved() {
        let mut data = card_data();
        data["listAfter"] = json!({"id": "L2"});
        assert_eq!(
            normalize(&delivery("updateCard", data)).unwrap().kind(),
            EventKind::TaskMoved
        );

        let mut data = card_data();
        data["listBefore"] = json!({"id": "L1"});
        assert_eq!(
            normalize(&delivery("updateCard", data)).unwrap().kind(),
            EventKind::TaskMoved
        );
    }

    #[test]
    fn test_update_card_without_list_change_is_task_updated() {
        let mut data = card_data();
        data["old"] = json!({"name": "Old name"});
        let event = normalize(&delivery("updateCard", data)).unwrap();
        assert_eq!(event.kind(), EventKind::TaskUpdated);
    }

    #[test]
    fn test_null_list_reference_does_not_count_as_a_move() {
        let mut data = card_data();
        data["listBefore"] = Value::Null;
        let event = normalize(&delivery("updateCard", data)).unwrap();
        assert_eq!(event.kind(), EventKind::TaskUpdated);
    }

    #[test]
    fn test_delete_and_close_card_are_task_deleted() {
        for action_type in ["deleteCard", "closeCard"] {
            let event = normalize(&delivery(action_type, card_data())).unwrap();
            assert_eq!(event.kind(), EventKind::TaskDeleted, "{action_type}");
        }
    }

    #[test]
    fn test_unmodeled_action_types_are_not_relevant() {
        for action_type in ["voteOnCard", "addMemberToCard", "createList", "updateBoard", ""] {
            assert!(
                normalize(&delivery(action_type, card_data())).is_none(),
                "{action_type} should not be relevant"
            );
        }
    }

    #[test]
    fn test_missing_board_is_not_relevant() {
        let data = json!({"card": {"id": "C1", "name": "X"}});
        assert!(normalize(&delivery("createCard", data)).is_none());

        let data = json!({"board": {"name": "no id"}, "card": {"id": "C1"}});
        assert!(normalize(&delivery("createCard", data)).is_none());

        let data = json!({"board": {"id": ""}, "card": {"id": "C1"}});
        assert!(normalize(&delivery("createCard", data)).is_none());

        let data = json!({"board": {"id": 42}, "card": {"id": "C1"}});
        assert!(normalize(&delivery("createCard", data)).is_none());
    }

    #[test]
    fn test_malformed_payloads_are_not_relevant() {
        let payloads = [
            Value::Null,
            json!([]),
            json!("createCard"),
            json!({}),
            json!({"action": null}),
            json!({"action": {"type": "createCard"}}),
            json!({"action": {"type": "createCard", "data": []}}),
            json!({"action": {"type": "createCard", "data": {"board": "B1"}}}),
            json!({"action": {"data": {"board": {"id": "B1"}}}}),
            json!({"action": {"type": 7, "data": {"board": {"id": "B1"}}}}),
        ];

        for payload in payloads {
            assert!(normalize(&payload).is_none(), "{payload} should not be relevant");
        }
    }

    #[test]
    fn test_payload_is_the_whole_action_data() {
        let data = card_data();
        let event = normalize(&delivery("createCard", data.clone())).unwrap();
        assert_eq!(Value::Object(event.payload().clone()), data);
    }
}
