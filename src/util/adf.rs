use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

/// The subset of Atlassian Document Format that carries readable text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AdfNode {
    Doc {
        #[serde(default, deserialize_with = "lenient_content")]
        content: Vec<AdfNode>,
    },
    Paragraph {
        #[serde(default, deserialize_with = "lenient_content")]
        content: Vec<AdfNode>,
    },
    BulletList {
        #[serde(default, deserialize_with = "lenient_content")]
        content: Vec<AdfNode>,
    },
    OrderedList {
        #[serde(default, deserialize_with = "lenient_content")]
        content: Vec<AdfNode>,
    },
    ListItem {
        #[serde(default, deserialize_with = "lenient_content")]
        content: Vec<AdfNode>,
    },
    CodeBlock {
        #[serde(default, deserialize_with = "lenient_content")]
        content: Vec<AdfNode>,
    },
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Unknown,
}

// Malformed children are dropped one by one instead of failing the whole document.
fn lenient_content<'de, D>(deserializer: D) -> Result<Vec<AdfNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| AdfNode::deserialize(v).ok())
        .collect())
}

impl AdfNode {
    fn render_block(&self, out: &mut Vec<String>) {
        match self {
            AdfNode::Doc { content } => {
                for child in content {
                    child.render_block(out);
                }
            }
            AdfNode::Paragraph { content } => {
                let line = inline_text(content);
                if !line.is_empty() {
                    out.push(line);
                }
            }
            AdfNode::BulletList { content } | AdfNode::OrderedList { content } => {
                for item in content {
                    item.render_block(out);
                }
            }
            AdfNode::ListItem { content } => {
                for inner in content {
                    match inner {
                        AdfNode::Paragraph { content } => {
                            let line = inline_text(content);
                            if !line.is_empty() {
                                out.push(format!("- {line}"));
                            }
                        }
                        other => other.render_block(out),
                    }
                }
            }
            AdfNode::CodeBlock { content } => {
                let code: Vec<&str> = content
                    .iter()
                    .filter_map(|n| match n {
                        AdfNode::Text { text } if !text.is_empty() => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                if !code.is_empty() {
                    out.push(format!("```\n{}\n```", code.join("\n")));
                }
            }
            AdfNode::Text { text } => {
                if !text.trim().is_empty() {
                    out.push(text.clone());
                }
            }
            AdfNode::Unknown => {}
        }
    }

    pub fn to_plain_text(&self) -> String {
        let mut lines = Vec::new();
        self.render_block(&mut lines);
        lines.join("\n").trim().to_string()
    }
}

fn inline_text(content: &[AdfNode]) -> String {
    content
        .iter()
        .filter_map(|n| match n {
            AdfNode::Text { text } if !text.is_empty() => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Flatten a description that is either plain text or an ADF document.
pub fn description_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Object(_) => AdfNode::deserialize(value)
            .map(|node| node.to_plain_text())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Build a minimal ADF document, one paragraph per non-empty line.
pub fn text_to_adf(text: &str) -> Value {
    let paragraphs: Vec<Value> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| {
            json!({
                "type": "paragraph",
                "content": [{ "type": "text", "text": l }]
            })
        })
        .collect();
    json!({ "type": "doc", "version": 1, "content": paragraphs })
}
