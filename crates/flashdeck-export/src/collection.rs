//! Rows written into the package database.
//!
//! A package holds one `col` row describing the collection (note type, deck,
//! deck options) followed by one note row and one card row per exported card.

use serde_json::{Value, json};

use crate::sql::{DEFAULT_CSS, FIELD_SEPARATOR, LATEX_POST, LATEX_PRE, SCHEMA_VERSION};

/// Name of the generated note type.
pub const MODEL_NAME: &str = "Basic";

/// The single `col` row.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRow {
    /// Always 1.
    pub id: i64,
    /// Creation time, seconds.
    pub crt: i64,
    /// Modification time, milliseconds.
    pub modified: i64,
    /// Schema modification time, milliseconds.
    pub scm: i64,
    /// Schema version.
    pub ver: i64,
    /// Dirty flag.
    pub dty: i64,
    /// Update sequence number.
    pub usn: i64,
    /// Last sync time.
    pub ls: i64,
    /// Global configuration JSON.
    pub conf: String,
    /// Note type definitions JSON.
    pub models: String,
    /// Deck definitions JSON.
    pub decks: String,
    /// Deck option groups JSON.
    pub dconf: String,
    /// Tag cache JSON.
    pub tags: String,
}

impl CollectionRow {
    /// Build the collection row for a package holding a single deck.
    ///
    /// `now_ms` is the build time in milliseconds.
    pub fn new(deck_name: &str, deck_id: i64, model_id: i64, now_ms: i64) -> Self {
        let now = now_ms / 1000;
        Self {
            id: 1,
            crt: now,
            modified: now_ms,
            scm: now_ms,
            ver: SCHEMA_VERSION,
            dty: 0,
            usn: 0,
            ls: 0,
            conf: conf_json(deck_id, model_id).to_string(),
            models: models_json(deck_id, model_id, now).to_string(),
            decks: decks_json(deck_name, deck_id, now).to_string(),
            dconf: dconf_json().to_string(),
            tags: "{}".to_string(),
        }
    }
}

fn conf_json(deck_id: i64, model_id: i64) -> Value {
    json!({
        "activeDecks": [deck_id],
        "curDeck": deck_id,
        "newSpread": 0,
        "collapseTime": 1200,
        "timeLim": 0,
        "estTimes": true,
        "dueCounts": true,
        "curModel": model_id,
        "nextPos": 1,
        "sortType": "noteFld",
        "sortBackwards": false,
        "addToCur": true
    })
}

fn models_json(deck_id: i64, model_id: i64, now: i64) -> Value {
    let field = |name: &str, ord: i64| {
        json!({
            "name": name,
            "ord": ord,
            "sticky": false,
            "rtl": false,
            "font": "Arial",
            "size": 20,
            "media": []
        })
    };

    let model = json!({
        "id": model_id,
        "name": MODEL_NAME,
        "type": 0,
        "mod": now,
        "usn": -1,
        "sortf": 0,
        "did": deck_id,
        "tmpls": [{
            "name": "Card 1",
            "ord": 0,
            "qfmt": "{{Front}}",
            "afmt": "{{FrontSide}}<hr id=answer>{{Back}}",
            "bqfmt": "",
            "bafmt": "",
            "did": null,
            "bfont": "",
            "bsize": 0
        }],
        "flds": [field("Front", 0), field("Back", 1)],
        "css": DEFAULT_CSS,
        "latexPre": LATEX_PRE,
        "latexPost": LATEX_POST,
        "latexsvg": false,
        "req": [[0, "any", [0]]],
        "vers": [],
        "tags": []
    });

    let mut models = serde_json::Map::new();
    models.insert(model_id.to_string(), model);
    Value::Object(models)
}

// Only the requested deck: the importer would otherwise create an empty
// "Default" deck next to it.
fn decks_json(deck_name: &str, deck_id: i64, now: i64) -> Value {
    let deck = json!({
        "id": deck_id,
        "name": deck_name,
        "mod": now,
        "usn": -1,
        "lrnToday": [0, 0],
        "revToday": [0, 0],
        "newToday": [0, 0],
        "timeToday": [0, 0],
        "collapsed": false,
        "browserCollapsed": false,
        "desc": "",
        "dyn": 0,
        "conf": 1,
        "extendNew": 10,
        "extendRev": 50
    });

    let mut decks = serde_json::Map::new();
    decks.insert(deck_id.to_string(), deck);
    Value::Object(decks)
}

fn dconf_json() -> Value {
    json!({
        "1": {
            "id": 1,
            "name": "Default",
            "mod": 0,
            "usn": 0,
            "maxTaken": 60,
            "autoplay": true,
            "timer": 0,
            "replayq": true,
            "new": {
                "bury": true,
                "delays": [1, 10],
                "initialFactor": 2500,
                "ints": [1, 4, 7],
                "order": 1,
                "perDay": 20
            },
            "rev": {
                "bury": true,
                "ease4": 1.3,
                "fuzz": 0.05,
                "ivlFct": 1,
                "maxIvl": 36500,
                "perDay": 200,
                "hardFactor": 1.2
            },
            "lapse": {
                "delays": [10],
                "leechAction": 0,
                "leechFails": 8,
                "minInt": 1,
                "mult": 0
            },
            "dyn": false
        }
    })
}

/// A row in `notes`.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRow {
    /// Note id.
    pub id: i64,
    /// Import identity.
    pub guid: String,
    /// Note type id.
    pub mid: i64,
    /// Modification time, seconds.
    pub modified: i64,
    /// Space-padded tag string.
    pub tags: String,
    /// Front and back joined by the field separator.
    pub flds: String,
    /// Sort field (the front).
    pub sfld: String,
    /// Checksum of the sort field.
    pub csum: i64,
}

impl NoteRow {
    /// Join front and back into the stored field blob.
    pub fn join_fields(front: &str, back: &str) -> String {
        let mut flds = String::with_capacity(front.len() + back.len() + 1);
        flds.push_str(front);
        flds.push(FIELD_SEPARATOR);
        flds.push_str(back);
        flds
    }

    /// Format tags the way the importer stores them: `" a b "`, or `""`.
    pub fn tag_string(tags: &[String]) -> String {
        if tags.is_empty() {
            String::new()
        } else {
            format!(" {} ", tags.join(" "))
        }
    }
}

/// A row in `cards`.
///
/// Scheduling columns not listed here (`type`, `queue`, `ivl`, `factor`,
/// `reps`, `lapses`, `left`, `odue`, `odid`, `flags`) are always 0: exported
/// cards arrive unseen.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRow {
    /// Card id.
    pub id: i64,
    /// Owning note id.
    pub nid: i64,
    /// Deck id.
    pub did: i64,
    /// Template ordinal.
    pub ord: i64,
    /// Modification time, seconds.
    pub modified: i64,
    /// Position in the new-card queue.
    pub due: i64,
}

impl CardRow {
    /// An unseen card for the first template, queued at `position`.
    pub fn new_card(id: i64, nid: i64, did: i64, modified: i64, position: i64) -> Self {
        Self {
            id,
            nid,
            did,
            ord: 0,
            modified,
            due: position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_single_named_deck() {
        let row = CollectionRow::new("Test Deck", 111, 222, 1_700_000_000_000);
        let decks = parse(&row.decks);
        let decks = decks.as_object().unwrap();

        assert_eq!(decks.len(), 1);
        let deck = &decks["111"];
        assert_eq!(deck["name"], "Test Deck");
        assert_eq!(deck["id"], 111);
        assert!(!row.decks.contains("\"Default\""));
    }

    #[test]
    fn test_conf_points_at_deck_and_model() {
        let row = CollectionRow::new("Deck", 111, 222, 1_700_000_000_000);
        let conf = parse(&row.conf);
        assert_eq!(conf["curDeck"], 111);
        assert_eq!(conf["activeDecks"], json!([111]));
        assert_eq!(conf["curModel"], 222);
    }

    #[test]
    fn test_model_definition() {
        let row = CollectionRow::new("Deck", 111, 222, 1_700_000_000_000);
        let models = parse(&row.models);
        let model = &models["222"];
        assert_eq!(model["name"], MODEL_NAME);
        assert_eq!(model["did"], 111);
        assert_eq!(model["flds"][0]["name"], "Front");
        assert_eq!(model["flds"][1]["name"], "Back");
        assert_eq!(model["tmpls"].as_array().unwrap().len(), 1);
        assert_eq!(model["tmpls"][0]["qfmt"], "{{Front}}");
    }

    #[test]
    fn test_timestamps_and_version() {
        let row = CollectionRow::new("Deck", 1, 2, 1_700_000_123_456);
        assert_eq!(row.id, 1);
        assert_eq!(row.crt, 1_700_000_123);
        assert_eq!(row.modified, 1_700_000_123_456);
        assert_eq!(row.scm, 1_700_000_123_456);
        assert_eq!(row.ver, 11);
        assert_eq!(row.tags, "{}");
        assert!(parse(&row.dconf)["1"].is_object());
    }

    #[test]
    fn test_deck_name_is_json_escaped() {
        let row = CollectionRow::new("He said \"hi\"", 1, 2, 0);
        assert_eq!(parse(&row.decks)["1"]["name"], "He said \"hi\"");
    }

    #[test]
    fn test_tag_string() {
        let tags = vec!["math".to_string(), "algebra".to_string()];
        assert_eq!(NoteRow::tag_string(&tags), " math algebra ");
        assert_eq!(NoteRow::tag_string(&[]), "");
    }

    #[test]
    fn test_join_fields() {
        assert_eq!(NoteRow::join_fields("Q", "A"), "Q\u{1f}A");
    }

    #[test]
    fn test_new_card_position() {
        let card = CardRow::new_card(10, 9, 8, 7, 3);
        assert_eq!(card.ord, 0);
        assert_eq!(card.due, 3);
        assert_eq!(card.nid, 9);
    }
}
