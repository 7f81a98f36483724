use serde::Deserialize;

/// Card metadata as returned by the Scryfall `cards/named` endpoint. Only the
/// fields used for display are kept.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CardInfo {
    pub name: String,
    pub scryfall_uri: String,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub cmc: Option<f64>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub set_name: Option<String>,
    #[serde(default)]
    pub color_identity: Vec<String>,
}

impl CardInfo {
    /// Multi-line summary: name and cost, type, rules text, then the
    /// remaining attributes on one line.
    pub fn details(&self) -> String {
        let mut lines = vec![match &self.mana_cost {
            Some(cost) if !cost.is_empty() => format!("{} {}", self.name, cost),
            _ => self.name.clone(),
        }];
        lines.extend(self.type_line.clone());
        lines.extend(self.oracle_text.clone().filter(|text| !text.is_empty()));

        let mut extra = Vec::new();
        if let Some(cmc) = self.cmc {
            extra.push(format!("Mana value: {}", cmc));
        }
        if !self.color_identity.is_empty() {
            extra.push(format!("Colors: {}", self.color_identity.join("")));
        }
        extra.extend(self.rarity.clone());
        extra.extend(self.set_name.clone());
        if !extra.is_empty() {
            lines.push(extra.join(" | "));
        }

        lines.join("\n")
    }
}

/// Display string for a card: a markdown link when metadata was found,
/// otherwise a not-found marker.
pub fn card_link(name: &str, info: Option<&CardInfo>) -> String {
    match info {
        Some(info) => format!("[{}](<{}>)", name, info.scryfall_uri),
        None => format!("[{}]<URL Not Found>", name),
    }
}
