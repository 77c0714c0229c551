use super::*;

#[test]
fn canonical_name_converts_camel_case_to_snake_case() {
    assert_eq!(canonical_name("sortName"), "sort_name");
    assert_eq!(canonical_name("createdAtFrom"), "created_at_from");
    assert_eq!(canonical_name("per_page"), "per_page");
}

#[test]
fn registry_always_tracks_pagination_keys_first() {
    let registry = KeyRegistry::new("page", "perPage", &["status"]);

    assert_eq!(registry.page().canonical.as_str(), "page");
    assert_eq!(registry.per_page().display.as_str(), "perPage");
    assert_eq!(registry.per_page().canonical.as_str(), "per_page");
    assert_eq!(registry.keys().len(), 3);
}

#[test]
fn display_and_canonical_names_are_one_to_one() {
    let registry = KeyRegistry::new("page", "per_page", &["sortName", "status", "sort_name"]);

    let mut canonical: Vec<&str> = registry
        .keys()
        .iter()
        .map(|key| key.canonical.as_str())
        .collect();
    canonical.sort_unstable();
    canonical.dedup();
    assert_eq!(canonical.len(), registry.keys().len());

    for key in registry.keys() {
        assert_eq!(canonical_name(key.display.as_str()), key.canonical.as_str());
    }
    assert_eq!(
        registry
            .lookup("sort_name")
            .map(|key| key.display.as_str()),
        Some("sortName")
    );
}

#[test]
fn duplicate_canonical_filter_key_keeps_first_registration() {
    let registry = KeyRegistry::new("page", "per_page", &["ownerId", "owner_id", "perPage"]);

    let displays: Vec<&str> = registry
        .keys()
        .iter()
        .map(|key| key.display.as_str())
        .collect();
    assert_eq!(displays, vec!["page", "per_page", "ownerId"]);
}

#[test]
fn pagination_keys_coerce_to_integers_with_defaults() {
    let registry = KeyRegistry::new("page", "per_page", &[] as &[&str]);
    let page = &registry.page().coercion;
    let per_page = &registry.per_page().coercion;

    assert_eq!(page.apply(None), Some(ParamValue::Int(1)));
    assert_eq!(page.apply(Some("")), Some(ParamValue::Int(1)));
    assert_eq!(page.apply(Some("5")), Some(ParamValue::Int(5)));
    assert_eq!(page.apply(Some("nope")), Some(ParamValue::Int(1)));
    assert_eq!(per_page.apply(None), Some(ParamValue::Int(20)));
    assert_eq!(per_page.apply(Some("50")), Some(ParamValue::Int(50)));
}

#[test]
fn filter_keys_default_to_identity_and_accept_custom_coercions() {
    let registry = KeyRegistry::new("page", "per_page", &["status", "ownerId"])
        .with_coercion(
            "ownerId",
            Coercion::custom(|raw| raw.and_then(parse_leading_int).map(ParamValue::Int)),
        )
        .with_coercion("page", Coercion::Identity);

    let status = registry.lookup("status").expect("status key");
    assert_eq!(status.coercion.apply(Some("open")), Some(ParamValue::from("open")));
    assert_eq!(status.coercion.apply(None), None);

    let owner = registry.lookup("owner_id").expect("owner key");
    assert_eq!(owner.coercion.apply(Some("42")), Some(ParamValue::Int(42)));

    assert_eq!(registry.page().coercion.apply(Some("x")), Some(ParamValue::Int(1)));
}

#[test]
fn route_params_are_coerced_from_query() {
    let registry = KeyRegistry::new("page", "per_page", &["status"]);
    let mut query = Query::new();
    query.insert("page".into(), "3".into());
    query.insert("status".into(), "open".into());
    query.insert("unrelated".into(), "x".into());

    let params = registry.route_params(&query);
    assert_eq!(params.get("page"), Some(&ParamValue::Int(3)));
    assert_eq!(params.get("per_page"), Some(&ParamValue::Int(20)));
    assert_eq!(params.get("status"), Some(&ParamValue::from("open")));
    assert_eq!(params.get("unrelated"), None);
    assert_eq!(params.to_payload().len(), 3);
}

#[test]
fn sort_keys_are_detected_by_canonical_name() {
    let registry = KeyRegistry::new("page", "per_page", &["sortName", "status", "sort_date"]);
    let sort_keys: Vec<&str> = registry
        .sort_keys()
        .map(|key| key.canonical.as_str())
        .collect();
    assert_eq!(sort_keys, vec!["sort_name", "sort_date"]);
}
