//! Tile and ground item definitions.

use serde::Serialize;

use crate::game::types::Orientation;

/// Items lying on a tile or carried by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Item {
    /// Decorative clutter. Cannot be picked up.
    Rubbish,
    /// A player's objective, tinted with their color.
    Collector { color: String },
    /// Opens the door with the given entity id.
    Key { door_id: String },
}

impl Item {
    pub fn collectable(&self) -> bool {
        matches!(self, Item::Collector { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    /// Not generated yet; becomes a wall once the level is finished.
    Unknown,
    Floor,
    Wall,
    /// Wall segment framing a doorway.
    ThinWall,
    /// Passage hosting a door entity.
    Doorway(Orientation),
    /// Marker around an enemy spawner.
    Totem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub kind: TileKind,
    pub image: String,
    pub item: Option<Item>,
}

/// Wire representation of a tile.
#[derive(Debug, Serialize)]
pub struct TileView<'a> {
    pub image: &'a str,
    pub movement_allowed: bool,
    pub opaque: bool,
    pub item: Option<&'a Item>,
}

impl Tile {
    pub fn new(kind: TileKind, image: impl Into<String>) -> Self {
        Self { kind, image: image.into(), item: None }
    }

    pub fn unknown() -> Self {
        Self::new(TileKind::Unknown, "void")
    }

    pub fn floor() -> Self {
        Self::new(TileKind::Floor, "floor")
    }

    pub fn wall(image: impl Into<String>) -> Self {
        Self::new(TileKind::Wall, image)
    }

    pub fn walkable(&self) -> bool {
        matches!(self.kind, TileKind::Floor | TileKind::Doorway(_))
    }

    pub fn opaque(&self) -> bool {
        !matches!(self.kind, TileKind::Floor)
    }

    pub fn view(&self) -> TileView<'_> {
        TileView {
            image: &self.image,
            movement_allowed: self.walkable(),
            opaque: self.opaque(),
            item: self.item.as_ref(),
        }
    }
}
