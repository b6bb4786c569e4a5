//! Joint-state tensor.
//!
//! Channel layout, each channel `height x width`:
//! - 0..3: waste of each tier lying on the cell
//! - 3..6: an agent of each tier standing on the cell
//! - 6..15: carried waste by (agent tier, waste tier), `6 + 3 * agent + waste`

use mission_events::Tier;

use crate::world::World;

pub const STATE_CHANNELS: usize = Tier::COUNT * (Tier::COUNT + 2);

const AGENT_CHANNELS: usize = Tier::COUNT;
const INVENTORY_CHANNELS: usize = 2 * Tier::COUNT;

/// Dense `channels x height x width` tensor, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTensor {
    height: usize,
    width: usize,
    data: Vec<f32>,
}

impl StateTensor {
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            data: vec![0.0; STATE_CHANNELS * height * width],
        }
    }

    pub fn from_world(world: &World) -> Self {
        let grid = world.grid();
        let mut tensor = Self::zeros(grid.height() as usize, grid.width() as usize);

        for (position, waste) in grid.wastes() {
            tensor.add(waste.tier().index(), position.x, position.y, 1.0);
        }
        for agent in world.agents() {
            let Ok(position) = agent.position() else {
                continue;
            };
            tensor.add(AGENT_CHANNELS + agent.tier.index(), position.x, position.y, 1.0);
            for waste in agent.inventory.iter() {
                let channel =
                    INVENTORY_CHANNELS + agent.tier.index() * Tier::COUNT + waste.tier().index();
                tensor.add(channel, position.x, position.y, 1.0);
            }
        }
        tensor
    }

    /// `(channels, height, width)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (STATE_CHANNELS, self.height, self.width)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    fn offset(&self, channel: usize, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (channel < STATE_CHANNELS && x < self.width && y < self.height)
            .then(|| (channel * self.height + y) * self.width + x)
    }

    /// Zero outside the tensor.
    pub fn get(&self, channel: usize, x: i32, y: i32) -> f32 {
        self.offset(channel, x, y).map_or(0.0, |i| self.data[i])
    }

    fn add(&mut self, channel: usize, x: i32, y: i32, value: f32) {
        if let Some(i) = self.offset(channel, x, y) {
            self.data[i] += value;
        }
    }

    /// Sum of one channel over the grid.
    pub fn channel_sum(&self, channel: usize) -> f32 {
        let plane = self.height * self.width;
        self.data
            .get(channel * plane..(channel + 1) * plane)
            .map_or(0.0, |values| values.iter().sum())
    }
}
