use serde_yaml::Value;

// ---------------------------------------------------------------------------
// Card: a single flashcard
// ---------------------------------------------------------------------------

/// A single flashcard: question on the front, answer on the back, and an
/// optional note shown under the answer.
///
/// Cards are immutable once built. The only ways in are [`Card::new`] and
/// [`Card::from_record`], both of which enforce non-blank `front` and `back`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    front: String,
    back: String,
    note: Option<String>,
}

impl Card {
    /// Build a card, rejecting blank sides. A blank note counts as absent.
    pub fn new(
        front: impl Into<String>,
        back: impl Into<String>,
        note: Option<String>,
    ) -> Result<Self, String> {
        let front = front.into();
        let back = back.into();
        if front.trim().is_empty() {
            return Err("card front is empty".to_string());
        }
        if back.trim().is_empty() {
            return Err("card back is empty".to_string());
        }
        let note = note.filter(|n| !n.trim().is_empty());
        Ok(Self { front, back, note })
    }

    /// Validate one raw card record from a deck file.
    ///
    /// Accepted shapes:
    ///
    /// * `[front, back]`
    /// * `[front, back, note]`
    /// * `{front: ..., back: ..., note: ...}` (note optional)
    ///
    /// Numbers and booleans are stringified. The error is a human-readable
    /// reason suitable for a warning line.
    pub fn from_record(record: &Value) -> Result<Self, String> {
        match record {
            Value::Sequence(fields) => {
                if fields.len() < 2 {
                    return Err(format!(
                        "card needs at least front and back, got {} field(s)",
                        fields.len()
                    ));
                }
                if fields.len() > 3 {
                    return Err(format!(
                        "card has {} fields, expected 2 or 3",
                        fields.len()
                    ));
                }
                let front = scalar_text(&fields[0]).ok_or("card front is not text")?;
                let back = scalar_text(&fields[1]).ok_or("card back is not text")?;
                let note = match fields.get(2) {
                    Some(Value::Null) | None => None,
                    Some(v) => Some(scalar_text(v).ok_or("card note is not text")?),
                };
                Card::new(front, back, note)
            }
            Value::Mapping(map) => {
                let front = map
                    .get("front")
                    .ok_or("card is missing 'front'")
                    .and_then(|v| scalar_text(v).ok_or("card front is not text"))?;
                let back = map
                    .get("back")
                    .ok_or("card is missing 'back'")
                    .and_then(|v| scalar_text(v).ok_or("card back is not text"))?;
                let note = match map.get("note") {
                    Some(Value::Null) | None => None,
                    Some(v) => Some(scalar_text(v).ok_or("card note is not text")?),
                };
                Card::new(front, back, note)
            }
            other => Err(format!("card must be a list or mapping, got {}", kind_of(other))),
        }
    }

    pub fn front(&self) -> &str {
        &self.front
    }

    pub fn back(&self) -> &str {
        &self.back
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Text shown on the answer face: the back, plus the note on its own line.
    pub fn answer_text(&self) -> String {
        match &self.note {
            Some(note) => format!("{}\n{}", self.back, note),
            None => self.back.clone(),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Short name of a YAML node's type, for warning messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
