// Module d'internationalisation (i18n)
// Charge les traductions depuis des fichiers JSON embarques dans le binaire
// et fournit une macro t!() pour acceder aux messages traduits.

use std::collections::HashMap;
use std::sync::RwLock;

// Fichiers JSON embarques dans le binaire
const EN_JSON: &str = include_str!("../langs/en.json");
const FR_JSON: &str = include_str!("../langs/fr.json");
const ES_JSON: &str = include_str!("../langs/es.json");

// Singleton global contenant les traductions chargees
static I18N: RwLock<Option<I18nStore>> = RwLock::new(None);

/// Stockage des traductions pour la langue selectionnee et le fallback anglais
struct I18nStore {
    current: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

/// Initialise ou reinitialise le systeme i18n avec la langue demandee.
pub fn init(language: &str) {
    let current_json = match language {
        "fr" => FR_JSON,
        "es" => ES_JSON,
        _ => EN_JSON,
    };

    let current = flatten_json(current_json);
    let fallback = if current_json == EN_JSON {
        current.clone()
    } else {
        flatten_json(EN_JSON)
    };

    let mut store = I18N.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *store = Some(I18nStore { current, fallback });
}

/// Recupere un message traduit par sa cle pointee (ex: "control.light_on").
/// Retourne le fallback anglais si la cle n'existe pas dans la langue courante,
/// et la cle elle-meme si i18n n'est pas initialise.
pub fn get(key: &str) -> String {
    let store = I18N.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    let Some(store) = store.as_ref() else {
        return key.to_string();
    };
    store
        .current
        .get(key)
        .or_else(|| store.fallback.get(key))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

/// Recupere un message traduit et remplace les arguments positionnels {0}, {1}, etc.
pub fn get_with_args(key: &str, args: &[&str]) -> String {
    let mut result = get(key);
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Aplatit un JSON imbrique en cles pointees.
/// Ex: {"gui": {"quit": "Quit"}} → {"gui.quit": "Quit"}
fn flatten_json(json_str: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(json_str) {
        flatten_value(&value, "", &mut map);
    }
    map
}

fn flatten_value(value: &serde_json::Value, prefix: &str, map: &mut HashMap<String, String>) {
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let new_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_value(val, &new_prefix, map);
            }
        }
        serde_json::Value::String(s) => {
            map.insert(prefix.to_string(), s.clone());
        }
        _ => {}
    }
}

/// Macro pour acceder facilement aux traductions.
/// Usage : t!("gui.quit") ou t!("control.applying_brightness", percentage)
#[macro_export]
macro_rules! t {
    ($key:expr) => {
        $crate::i18n::get($key)
    };
    ($key:expr, $($arg:expr),+) => {{
        let args: Vec<String> = vec![$($arg.to_string()),+];
        let refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
        $crate::i18n::get_with_args($key, &refs)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogues_share_the_same_keys() {
        let en = flatten_json(EN_JSON);
        assert!(!en.is_empty());
        for (name, json) in [("fr", FR_JSON), ("es", ES_JSON)] {
            let other = flatten_json(json);
            for key in en.keys() {
                assert!(other.contains_key(key), "{} is missing {}", name, key);
            }
        }
    }

    #[test]
    fn flattens_nested_objects() {
        let map = flatten_json(r#"{"a": {"b": "x", "c": {"d": "y"}}, "n": 3}"#);
        assert_eq!(map.get("a.b").map(String::as_str), Some("x"));
        assert_eq!(map.get("a.c.d").map(String::as_str), Some("y"));
        assert!(!map.contains_key("n"));
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        init("en");
        assert_eq!(get("no.such.key"), "no.such.key");
        assert_eq!(
            get_with_args("gui.brightness_label", &["73"]),
            "Brightness: 73%"
        );
    }
}
