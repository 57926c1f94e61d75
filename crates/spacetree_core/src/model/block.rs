//! Container block model (board / view / card triad).
//!
//! # Invariants
//! - A board block shares its id with the board page and is its own root.
//! - View and card blocks point at their board through `root_id` and `parent_id`.
//! - `fields` is an opaque JSON object; only the link-bearing keys are typed here.

use super::{BlockId, SpaceId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

const CARD_ORDER_FIELD: &str = "cardOrder";
const VIEW_IDS_FIELD: &str = "viewIds";
const LINKED_SOURCE_FIELD: &str = "linkedSourceId";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Board,
    View,
    Card,
}

impl BlockType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::View => "view",
            Self::Card => "card",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "board" => Some(Self::Board),
            "view" => Some(Self::View),
            "card" => Some(Self::Card),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerBlock {
    pub id: BlockId,
    pub space_id: SpaceId,
    pub root_id: BlockId,
    #[serde(default)]
    pub parent_id: Option<BlockId>,
    #[serde(rename = "type")]
    pub kind: BlockType,
    #[serde(default)]
    pub title: String,
    #[serde(default = "empty_fields")]
    pub fields: Value,
    #[serde(default = "default_schema")]
    pub schema: i64,
    pub created_by: UserId,
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub deleted_at: Option<i64>,
}

fn empty_fields() -> Value {
    Value::Object(Map::new())
}

fn default_schema() -> i64 {
    1
}

impl ContainerBlock {
    /// Creates a block with empty fields.
    pub fn new(
        id: BlockId,
        space_id: SpaceId,
        kind: BlockType,
        root_id: BlockId,
        parent_id: Option<BlockId>,
        created_by: UserId,
    ) -> Self {
        let now = super::now_epoch_ms();
        Self {
            id,
            space_id,
            root_id,
            parent_id,
            kind,
            title: String::new(),
            fields: empty_fields(),
            schema: default_schema(),
            created_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// View: ordered card ids. Entries that are not uuids are skipped.
    pub fn card_order(&self) -> Vec<BlockId> {
        self.id_list(CARD_ORDER_FIELD)
    }

    pub fn set_card_order(&mut self, card_ids: &[BlockId]) {
        self.set_id_list(CARD_ORDER_FIELD, card_ids);
    }

    /// Board: ids of its views.
    pub fn view_ids(&self) -> Vec<BlockId> {
        self.id_list(VIEW_IDS_FIELD)
    }

    pub fn set_view_ids(&mut self, view_ids: &[BlockId]) {
        self.set_id_list(VIEW_IDS_FIELD, view_ids);
    }

    /// View of a linked board: the page whose board it renders.
    pub fn linked_source_id(&self) -> Option<Uuid> {
        self.fields
            .get(LINKED_SOURCE_FIELD)
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }

    pub fn set_linked_source_id(&mut self, source_id: Uuid) {
        self.update_fields(|fields| {
            fields.insert(
                LINKED_SOURCE_FIELD.to_string(),
                Value::String(source_id.to_string()),
            );
        });
    }

    fn id_list(&self, key: &str) -> Vec<Uuid> {
        self.fields
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(|raw| Uuid::parse_str(raw).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_id_list(&mut self, key: &str, ids: &[Uuid]) {
        let values: Vec<Value> = ids.iter().map(|id| Value::String(id.to_string())).collect();
        self.update_fields(|fields| {
            fields.insert(key.to_string(), Value::Array(values));
        });
    }

    fn update_fields(&mut self, apply: impl FnOnce(&mut Map<String, Value>)) {
        let mut fields = match std::mem::take(&mut self.fields) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        apply(&mut fields);
        self.fields = Value::Object(fields);
    }
}
