//! Page node model.
//!
//! # Invariants
//! - `parent_id = None` means root-level page.
//! - Board-like pages share their id with the backing board block.
//! - Card pages share their id with the backing card block.

use super::{BlockId, PageId, SpaceId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Page type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Page,
    Board,
    InlineBoard,
    LinkedBoard,
    InlineLinkedBoard,
    Card,
    CardTemplate,
    Proposal,
    ProposalTemplate,
    Bounty,
    BountyTemplate,
}

impl PageType {
    pub const ALL: [PageType; 11] = [
        Self::Page,
        Self::Board,
        Self::InlineBoard,
        Self::LinkedBoard,
        Self::InlineLinkedBoard,
        Self::Card,
        Self::CardTemplate,
        Self::Proposal,
        Self::ProposalTemplate,
        Self::Bounty,
        Self::BountyTemplate,
    ];

    /// Storage/wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Board => "board",
            Self::InlineBoard => "inline_board",
            Self::LinkedBoard => "linked_board",
            Self::InlineLinkedBoard => "inline_linked_board",
            Self::Card => "card",
            Self::CardTemplate => "card_template",
            Self::Proposal => "proposal",
            Self::ProposalTemplate => "proposal_template",
            Self::Bounty => "bounty",
            Self::BountyTemplate => "bounty_template",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Pages backed by a board block plus views.
    pub fn is_board_like(self) -> bool {
        matches!(
            self,
            Self::Board | Self::InlineBoard | Self::LinkedBoard | Self::InlineLinkedBoard
        )
    }

    pub fn is_card(self) -> bool {
        matches!(self, Self::Card | Self::CardTemplate)
    }

    pub fn is_proposal(self) -> bool {
        matches!(self, Self::Proposal | Self::ProposalTemplate)
    }

    pub fn is_bounty(self) -> bool {
        matches!(self, Self::Bounty | Self::BountyTemplate)
    }
}

/// Page row as stored and as carried in snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageNode {
    pub id: PageId,
    pub space_id: SpaceId,
    pub parent_id: Option<PageId>,
    #[serde(rename = "type")]
    pub kind: PageType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub path: String,
    /// Sibling order; negative values sort after all non-negative ones.
    #[serde(default = "default_order_index")]
    pub order_index: i64,
    /// Opaque editor document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default)]
    pub content_text: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub header_image: Option<String>,
    #[serde(default)]
    pub board_id: Option<BlockId>,
    #[serde(default)]
    pub card_id: Option<BlockId>,
    #[serde(default)]
    pub bounty_id: Option<Uuid>,
    #[serde(default)]
    pub proposal_id: Option<Uuid>,
    #[serde(default)]
    pub is_template: bool,
    pub created_by: UserId,
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub deleted_at: Option<i64>,
}

fn default_order_index() -> i64 {
    -1
}

impl PageNode {
    /// Creates a live page with empty content.
    pub fn new(
        space_id: SpaceId,
        parent_id: Option<PageId>,
        kind: PageType,
        title: impl Into<String>,
        created_by: UserId,
    ) -> Self {
        let id = Uuid::new_v4();
        let now = super::now_epoch_ms();
        Self {
            id,
            space_id,
            parent_id,
            kind,
            title: title.into(),
            path: generate_page_path(),
            order_index: -1,
            content: None,
            content_text: String::new(),
            icon: None,
            header_image: None,
            board_id: None,
            card_id: None,
            bounty_id: None,
            proposal_id: None,
            is_template: false,
            created_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Generates a fresh page path of the form `page-<12 hex chars>`.
pub fn generate_page_path() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("page-{}", &raw[..12])
}
