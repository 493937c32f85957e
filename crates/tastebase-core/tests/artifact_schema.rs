use schemars::schema_for;
use serde_json::Value;
use tastebase_core::{RestaurantReviewStats, Review, UserAccount};

fn schema_json<T: schemars::JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).expect("serialize generated schema")
}

fn required(schema: &Value) -> Vec<&str> {
    schema["required"]
        .as_array()
        .expect("required list")
        .iter()
        .filter_map(Value::as_str)
        .collect()
}

#[test]
fn review_schema_lists_every_column() {
    let schema = schema_json::<Review>();
    let properties = schema["properties"].as_object().expect("properties");
    for column in [
        "review_id",
        "user_id",
        "restaurant_id",
        "rating",
        "review_text",
        "visited_at",
        "is_deleted",
        "created_at",
        "updated_at",
    ] {
        assert!(properties.contains_key(column), "missing {column}");
    }
    assert_eq!(schema["additionalProperties"], Value::Bool(false));
    assert_eq!(properties["created_at"]["type"], "string");

    let required = required(&schema);
    assert!(required.contains(&"rating"));
    assert!(!required.contains(&"review_text"));
    assert!(!required.contains(&"is_deleted"));
}

#[test]
fn user_account_schema_keeps_contact_fields_optional() {
    let schema = schema_json::<UserAccount>();
    let required = required(&schema);
    assert!(required.contains(&"username"));
    assert!(required.contains(&"password_hash"));
    assert!(!required.contains(&"email"));
    assert!(!required.contains(&"phone_number"));
}

#[test]
fn review_stats_schema_carries_refresh_time() {
    let schema = schema_json::<RestaurantReviewStats>();
    let required = required(&schema);
    for column in ["restaurant_id", "review_count", "avg_rating", "updated_at"] {
        assert!(required.contains(&column), "missing {column}");
    }
    assert_eq!(schema["properties"]["updated_at"]["type"], "string");
}
