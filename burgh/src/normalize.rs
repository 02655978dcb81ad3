//! Nettoyage des noms de burghs avant géocodage
//!
//! Supprime les mentions "royal burgh" / "burgh" (insensible à la casse)
//! puis les espaces de début et de fin. À chaque position, la forme longue
//! "royal burgh" est essayée avant "burgh" seul:
//! `"Royal Burgh of Ayr"` devient `"of Ayr"`.

use std::sync::OnceLock;

use regex::Regex;

const BURGH_PATTERN: &str = r"(?i)royal\s*burgh|burgh";

fn burgh_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BURGH_PATTERN).expect("static burgh pattern is valid"))
}

/// Nettoie un nom de burgh.
///
/// La suppression est répétée jusqu'à point fixe (`"BurBURGHgh"` ne laisse
/// pas de `"Burgh"` résiduel), ce qui rend la fonction idempotente.
pub fn normalize(raw: &str) -> String {
    let re = burgh_regex();
    let mut current = raw.to_string();
    while re.is_match(&current) {
        current = re.replace_all(&current, "").into_owned();
    }
    current.trim().to_string()
}
