//! Sea map topology.
//!
//! ```text
//!        top_left   top_right
//!     left     center     right
//!       bottom_left bottom_right
//! ```
//!
//! The center zone touches every ring zone. Ring zones touch their two ring
//! neighbours, unless a barrier sits on that edge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::types::{LocationName, ZoneName};

/// Ring zones in clockwise order.
pub const RING: [ZoneName; 6] = [
    ZoneName::TopRight,
    ZoneName::Right,
    ZoneName::BottomRight,
    ZoneName::BottomLeft,
    ZoneName::Left,
    ZoneName::TopLeft,
];

/// Barrier ids run 1..=BARRIER_COUNT.
pub const BARRIER_COUNT: u8 = 6;

pub type BarrierId = u8;

fn ring_index(zone: ZoneName) -> Option<usize> {
    RING.iter().position(|z| *z == zone)
}

/// The two ring zones a barrier separates.
///
/// Barrier k sits between ring zone k-1 and ring zone k (mod 6).
pub fn barrier_edge(barrier: BarrierId) -> Option<(ZoneName, ZoneName)> {
    if barrier == 0 || barrier > BARRIER_COUNT {
        return None;
    }
    let k = barrier as usize;
    Some((RING[k - 1], RING[k % RING.len()]))
}

/// Barriers that may not be drawn together with `barrier` (itself included).
pub fn incompatible_barriers(barrier: BarrierId) -> [BarrierId; 3] {
    let previous = if barrier == 1 { BARRIER_COUNT } else { barrier - 1 };
    let next = if barrier == BARRIER_COUNT { 1 } else { barrier + 1 };
    [previous, barrier, next]
}

fn is_blocked(a: ZoneName, b: ZoneName, barriers: &[BarrierId]) -> bool {
    barriers
        .iter()
        .filter_map(|id| barrier_edge(*id))
        .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// All zones adjacent to `zone`, ignoring barriers.
pub fn neighbours(zone: ZoneName) -> Vec<ZoneName> {
    match ring_index(zone) {
        None => RING.to_vec(),
        Some(i) => {
            let len = RING.len();
            vec![ZoneName::Center, RING[(i + len - 1) % len], RING[(i + 1) % len]]
        }
    }
}

/// Zones a player's ship can sail to from `zone`.
///
/// Barriers are honoured; `came_from` (the zone just left this turn) is
/// excluded so a ship cannot bounce straight back.
pub fn ship_destinations(
    zone: ZoneName,
    barriers: &[BarrierId],
    came_from: Option<ZoneName>,
) -> Vec<ZoneName> {
    neighbours(zone)
        .into_iter()
        .filter(|next| !is_blocked(zone, *next, barriers))
        .filter(|next| Some(*next) != came_from)
        .collect()
}

/// Zones the rival can move to. It ignores barriers but never enters the center.
pub fn rival_destinations(zone: ZoneName, came_from: Option<ZoneName>) -> Vec<ZoneName> {
    neighbours(zone)
        .into_iter()
        .filter(|next| *next != ZoneName::Center)
        .filter(|next| Some(*next) != came_from)
        .collect()
}

/// The board layout fixed during setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayout {
    pub locations: BTreeMap<ZoneName, LocationName>,
    pub barriers: Vec<BarrierId>,
}

impl MapLayout {
    /// Build a layout with the temple in the center and `ring_locations`
    /// assigned clockwise from the top right.
    pub fn new(ring_locations: [LocationName; 6], barriers: Vec<BarrierId>) -> Self {
        let mut locations = BTreeMap::new();
        locations.insert(ZoneName::Center, LocationName::Temple);
        for (zone, location) in RING.iter().zip(ring_locations) {
            locations.insert(*zone, location);
        }
        Self {
            locations,
            barriers,
        }
    }

    pub fn location_of(&self, zone: ZoneName) -> Option<LocationName> {
        self.locations.get(&zone).copied()
    }

    pub fn zone_of(&self, location: LocationName) -> Option<ZoneName> {
        self.locations
            .iter()
            .find(|(_, l)| **l == location)
            .map(|(z, _)| *z)
    }

    pub fn ship_destinations(&self, zone: ZoneName, came_from: Option<ZoneName>) -> Vec<ZoneName> {
        ship_destinations(zone, &self.barriers, came_from)
    }
}
