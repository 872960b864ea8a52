use std::collections::BTreeMap;

use frago_env::EnvLoader;
use frago_recipes::{validate_params, RecipeRegistry};

fn write_recipe(root: &std::path::Path, subdir: &str, name: &str) {
    let dir = root.join(subdir).join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("recipe.md"),
        format!(
            "---\nname: {name}\ntype: atomic\nruntime: python\nversion: \"1.0\"\ndescription: scrapes a thing\nuse_cases: [scrape]\noutput_targets: [stdout]\ninputs:\n  query:\n    type: string\n    required: true\nenv:\n  TOKEN:\n    required: true\n---\nbody\n"
        ),
    )
    .unwrap();
    std::fs::write(dir.join("recipe.py"), "print('{}')").unwrap();
}

#[test]
fn recipe_with_missing_required_env_fails_resolution_before_spawn() {
    let root = tempfile::tempdir().unwrap();
    write_recipe(root.path(), "atomic/system", "scrape-thing");

    let mut registry = RecipeRegistry::new(root.path());
    registry.scan();
    let recipe = registry.find("scrape-thing", None).unwrap();

    let mut params = BTreeMap::new();
    params.insert("query".to_string(), serde_json::json!("rust jobs"));
    assert!(validate_params(&recipe.metadata, &params).is_empty());

    let env_root = tempfile::tempdir().unwrap();
    let loader = EnvLoader::new(env_root.path());
    let declarations: BTreeMap<_, _> = recipe
        .metadata
        .env
        .iter()
        .map(|(k, v)| {
            (
                k.clone(),
                frago_env::EnvVarRequirement {
                    required: v.required,
                    default: v.default.clone(),
                },
            )
        })
        .collect();

    let result = loader.resolve_for_recipe(&declarations, None, &BTreeMap::new());
    match result {
        Err(frago_env::EnvError::MissingRequired(names)) => assert_eq!(names, vec!["TOKEN".to_string()]),
        other => panic!("expected missing TOKEN, got {other:?}"),
    }
}

#[test]
fn missing_required_param_is_collected() {
    let root = tempfile::tempdir().unwrap();
    write_recipe(root.path(), "atomic/system", "scrape-thing");

    let mut registry = RecipeRegistry::new(root.path());
    registry.scan();
    let recipe = registry.find("scrape-thing", None).unwrap();

    let errors = validate_params(&recipe.metadata, &BTreeMap::new());
    assert!(errors.iter().any(|e| e.contains("query")));
}
