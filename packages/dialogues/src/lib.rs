include!(concat!(env!("OUT_DIR"), "/dialogues.rs"));

/// A dialogue script with its id
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueScript {
    pub id: String,
    pub content: String,
}

/// Get all embedded dialogue scripts
pub fn get_all_dialogues() -> Vec<DialogueScript> {
    DIALOGUES
        .iter()
        .map(|(id, content)| DialogueScript {
            id: id.to_string(),
            content: content.to_string(),
        })
        .collect()
}

/// Get a dialogue script by id
pub fn get_dialogue(id: &str) -> Option<DialogueScript> {
    DIALOGUES
        .iter()
        .find(|(i, _)| *i == id)
        .map(|(id, content)| DialogueScript {
            id: id.to_string(),
            content: content.to_string(),
        })
}

/// List all dialogue ids
pub fn list_dialogues() -> Vec<&'static str> {
    DIALOGUES.iter().map(|(id, _)| *id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_dialogues_listed() {
        let ids = list_dialogues();
        assert!(ids.contains(&"morning_routine"));
        assert!(ids.contains(&"at_the_cafe"));
        assert_eq!(ids.len(), get_all_dialogues().len());
    }

    #[test]
    fn test_get_dialogue() {
        let script = get_dialogue("at_the_cafe").unwrap();
        assert_eq!(script.id, "at_the_cafe");
        assert!(script.content.starts_with("Title:"));
        assert!(get_dialogue("missing").is_none());
    }
}
