use serde_json::json;

use crate::Error;
use crate::types::{ApiEnvelope, Event, Profile, normalize_list, normalize_object};

#[test]
fn unsuccessful_envelope_becomes_api_error() {
    let envelope: ApiEnvelope =
        serde_json::from_value(json!({"success": false, "error": "Event is full"})).unwrap();
    match envelope.into_data() {
        Err(Error::Api(msg)) => assert_eq!(msg, "Event is full"),
        other => panic!("expected Error::Api, got {:?}", other),
    }

    let envelope: ApiEnvelope = serde_json::from_value(json!({})).unwrap();
    match envelope.into_data() {
        Err(Error::Api(msg)) => assert_eq!(msg, "request failed"),
        other => panic!("expected Error::Api, got {:?}", other),
    }
}

#[test]
fn lists_are_read_bare_wrapped_or_missing() {
    let event = json!({"_id": "e1", "title": "Sunday football"});

    let bare: Vec<Event> = normalize_list(Some(json!([event.clone()])), "events").unwrap();
    let wrapped: Vec<Event> =
        normalize_list(Some(json!({"events": [event.clone()]})), "events").unwrap();
    assert_eq!(bare, wrapped);
    assert_eq!(bare[0].id, "e1");

    let missing: Vec<Event> = normalize_list(None, "events").unwrap();
    let empty_object: Vec<Event> = normalize_list(Some(json!({})), "events").unwrap();
    assert!(missing.is_empty());
    assert!(empty_object.is_empty());

    let err = normalize_list::<Event>(Some(json!({"events": "nope"})), "events").unwrap_err();
    assert!(matches!(err, Error::Api(_)));
}

#[test]
fn objects_are_read_wrapped_or_direct() {
    let user = json!({"_id": "u1", "name": "sam", "sports": ["tennis"]});
    let wrapped: Profile = normalize_object(Some(json!({"user": user.clone()})), "user").unwrap();
    let direct: Profile = normalize_object(Some(user), "user").unwrap();
    assert_eq!(wrapped, direct);
    assert_eq!(direct.username, "sam");
    assert_eq!(direct.favorite_sports, vec!["tennis"]);

    assert!(matches!(
        normalize_object::<Profile>(None, "user"),
        Err(Error::Api(_))
    ));
}
